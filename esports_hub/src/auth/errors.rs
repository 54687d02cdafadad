//! Authentication error types.

use super::models::Role;
use crate::db::StoreError;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// No account for the given email
    #[error("No user found. Please register.")]
    UserNotFound,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// Account exists but does not hold the role the endpoint is scoped to
    #[error("Invalid {0} credentials")]
    RoleMismatch(Role),

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Malformed email address
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage and JWT errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Store(_) => "Internal server error".to_string(),
            AuthError::HashingFailed => "Internal server error".to_string(),
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_mismatch_message_names_role() {
        assert_eq!(
            AuthError::RoleMismatch(Role::Admin).to_string(),
            "Invalid admin credentials"
        );
    }

    #[test]
    fn test_store_errors_are_sanitized() {
        let err = AuthError::Store(StoreError::Decode("column role".to_string()));
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(
            AuthError::EmailTaken.client_message(),
            "Email already registered"
        );
    }
}
