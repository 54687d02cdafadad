//! Authentication API handlers.
//!
//! - Registration of participant accounts
//! - Login, either generic (optionally pinned to a role) or through the
//!   role-scoped admin/user endpoints
//! - Logout
//!
//! # Examples
//!
//! Register a new participant:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "player@example.com", "password": "hunter22", "name": "Player"}'
//! ```
//!
//! Login as admin:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/auth/login/admin \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "admin@example.com", "password": "password"}'
//! ```

use axum::{Json, extract::State, http::HeaderMap};
use esports_hub::TournamentError;
use esports_hub::auth::{AuthResult, LoginRequest, LoginResponse, RegisterRequest, Role, User};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    error::{ApiError, ApiJson},
    middleware::{AuthenticatedCaller, bearer_token},
};
use crate::{logging::log_security_event, metrics};

/// Generic login body; `role` pins the login to one account type
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Register a new participant account.
///
/// # Response
///
/// `200 OK` with `{"success": true, "message": "Registration successful", "user": {...}}`
///
/// # Errors
///
/// - `400 Bad Request`: Invalid email or weak password
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let user = state.auth_manager.register(request).await?;
    metrics::registrations_total();

    Ok(Json(RegisterResponse {
        success: true,
        message: "Registration successful".to_string(),
        user,
    }))
}

/// Authenticate with any role, or the one named in the body.
///
/// # Response
///
/// `200 OK` with `{"token": "...", "expires_at": "...", "user": {...}}`
///
/// # Errors
///
/// - `404 Not Found`: No account for this email
/// - `401 Unauthorized`: Wrong password or role mismatch
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = LoginRequest {
        email: payload.email,
        password: payload.password,
    };

    let result = match payload.role {
        Some(role) => state.auth_manager.login_as(request, role).await,
        None => state.auth_manager.login(request).await,
    };
    finish_login(result)
}

/// Login restricted to admin accounts
pub async fn login_admin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    finish_login(state.auth_manager.login_as(request, Role::Admin).await)
}

/// Login restricted to participant accounts
pub async fn login_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    finish_login(state.auth_manager.login_as(request, Role::User).await)
}

fn finish_login(result: AuthResult<LoginResponse>) -> Result<Json<LoginResponse>, ApiError> {
    metrics::login_attempts_total(result.is_ok());
    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            log_security_event("login_failed", None, &e.to_string());
            Err(e.into())
        }
    }
}

/// Logout.
///
/// Tokens are stateless; the server only confirms the token and the client
/// discards it.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
pub async fn logout(
    State(state): State<AppState>,
    AuthenticatedCaller(_caller): AuthenticatedCaller,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or(ApiError::from(TournamentError::Unauthenticated))?;
    state.auth_manager.logout(token)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Logged out".to_string(),
    }))
}
