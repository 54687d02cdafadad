//! Storage error types.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by any store backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation exceeded its deadline
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Unique constraint rejected a write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Stored value could not be mapped back to a domain type
    #[error("Failed to decode stored value: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether the failure was a unique-constraint conflict
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::UniqueViolation(_) => true,
            StoreError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Translate a sqlx error, surfacing unique violations as their own variant
pub(crate) fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unique").to_string();
        return StoreError::UniqueViolation(constraint);
    }
    StoreError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        assert!(StoreError::UniqueViolation("uq_registration_tournament_user".into()).is_unique_violation());
        assert!(!StoreError::Timeout(Duration::from_secs(5)).is_unique_violation());
        assert!(!StoreError::Database(sqlx::Error::RowNotFound).is_unique_violation());
    }

    #[test]
    fn test_timeout_display() {
        let err = StoreError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
    }
}
