//! Identity middleware and caller extractors.
//!
//! [`identity_middleware`] runs on every API route. It validates the bearer
//! token when one is sent and stores the resulting [`Caller`] in request
//! extensions. Requests without an `Authorization` header pass through
//! anonymously; handlers pick the extractor matching their needs:
//!
//! ```rust,no_run
//! use eh_server::api::middleware::{AuthenticatedCaller, OptionalCaller};
//!
//! async fn admin_only(AuthenticatedCaller(caller): AuthenticatedCaller) -> String {
//!     format!("caller {} ({})", caller.user_id, caller.role)
//! }
//!
//! async fn public(OptionalCaller(caller): OptionalCaller) -> String {
//!     format!("anonymous: {}", caller.is_none())
//! }
//! # let _ = (admin_only, public);
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use esports_hub::{Caller, TournamentError};
use std::convert::Infallible;

use super::{AppState, error::ApiError};
use crate::logging::log_security_event;

/// Bearer token from the `Authorization` header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller from the bearer token.
///
/// # Behavior
///
/// - **No header**: request continues without a `Caller`
/// - **Valid token**: `Caller` inserted into request extensions
/// - **Malformed header or invalid/expired token**: `401 Unauthorized`
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(AUTHORIZATION) {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        log_security_event(
            "malformed_authorization",
            None,
            "Authorization header is not a bearer token",
        );
        return ApiError::unauthenticated("Invalid authorization header").into_response();
    };

    match state.auth_manager.verify_access_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(Caller::from(&claims));
            next.run(request).await
        }
        Err(e) => {
            log_security_event("invalid_token", None, &e.to_string());
            ApiError::unauthenticated("Invalid or expired token").into_response()
        }
    }
}

/// Caller required; rejects anonymous requests with 401
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedCaller(pub Caller);

impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .map(AuthenticatedCaller)
            .ok_or_else(|| TournamentError::Unauthenticated.into())
    }
}

/// Caller if the request carried a valid token
#[derive(Debug, Clone, Copy)]
pub struct OptionalCaller(pub Option<Caller>);

impl<S> FromRequestParts<S> for OptionalCaller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalCaller(parts.extensions.get::<Caller>().copied()))
    }
}
