//! HTTP error responses.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use esports_hub::{
    auth::AuthError,
    tournament::{ErrorKind, TournamentError},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Error returned by handlers; rendered as `(status, Json<ErrorResponse>)`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorKind::Validation.code(), message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorKind::Unauthenticated.code(),
            message,
        )
    }
}

/// HTTP status for each domain error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Duplicate | ErrorKind::CapacityExceeded | ErrorKind::InvalidState => {
            StatusCode::CONFLICT
        }
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Infrastructure {
            tracing::error!("Tournament operation failed: {}", err);
        }
        Self::new(status_for(kind), kind.code(), err.client_message())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::InvalidPassword | AuthError::RoleMismatch(_) | AuthError::JwtError(_) => {
                ErrorKind::Unauthenticated
            }
            AuthError::EmailTaken => ErrorKind::Duplicate,
            AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => ErrorKind::Validation,
            AuthError::Store(_) | AuthError::HashingFailed => {
                tracing::error!("Authentication failed internally: {}", err);
                ErrorKind::Infrastructure
            }
        };
        Self::new(status_for(kind), kind.code(), err.client_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// `Json` extractor whose rejections use the API error shape
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}
