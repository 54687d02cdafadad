//! Tournament error types.

use super::models::TournamentStatus;
use crate::db::StoreError;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Referenced entity does not exist; carries the entity name
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Caller holds the wrong role for the operation
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Missing user context. Please login again.")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("You are already registered")]
    AlreadyRegistered,

    #[error("Tournament slots are full")]
    TournamentFull { capacity: i64 },

    #[error("Tournament is already {0}")]
    InvalidState(TournamentStatus),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Stable classification of [`TournamentError`], independent of wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Unauthenticated,
    Validation,
    Duplicate,
    CapacityExceeded,
    InvalidState,
    Infrastructure,
}

impl ErrorKind {
    /// Machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Validation => "validation",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Infrastructure => "infrastructure",
        }
    }
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::NotFound(_) => ErrorKind::NotFound,
            TournamentError::Forbidden(_) => ErrorKind::Forbidden,
            TournamentError::Unauthenticated => ErrorKind::Unauthenticated,
            TournamentError::Validation(_) => ErrorKind::Validation,
            TournamentError::AlreadyRegistered => ErrorKind::Duplicate,
            TournamentError::TournamentFull { .. } => ErrorKind::CapacityExceeded,
            TournamentError::InvalidState(_) => ErrorKind::InvalidState,
            TournamentError::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// Get a client-safe error message
    ///
    /// Storage failures never expose driver or SQL details.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_messages() {
        assert_eq!(
            TournamentError::NotFound("Tournament").to_string(),
            "Tournament not found"
        );
        assert_eq!(
            TournamentError::InvalidState(TournamentStatus::Completed).to_string(),
            "Tournament is already completed"
        );
        assert_eq!(
            TournamentError::TournamentFull { capacity: 8 }.to_string(),
            "Tournament slots are full"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            TournamentError::AlreadyRegistered.kind(),
            ErrorKind::Duplicate
        );
        assert_eq!(
            TournamentError::TournamentFull { capacity: 1 }.kind().code(),
            "capacity_exceeded"
        );
        assert_eq!(
            TournamentError::Unauthenticated.kind(),
            ErrorKind::Unauthenticated
        );
    }

    #[test]
    fn test_store_errors_are_sanitized() {
        let err = TournamentError::from(StoreError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(err.client_message(), "Internal server error");
    }
}
