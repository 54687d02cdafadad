//! Persistence layer.
//!
//! [`TournamentStore`] and [`UserRepository`] are the seams the domain services
//! depend on. [`PgStore`] implements them on a PostgreSQL pool managed by
//! [`Database`]; [`MemoryStore`] implements them in process.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{StoreTx, TournamentStore, UserRepository};

/// Schema applied by [`Database::ensure_schema`]
pub const SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use esports_hub::db::{Database, DatabaseConfig, PgStore};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), esports_hub::db::StoreError> {
    ///     let db = Database::new(&DatabaseConfig::from_env()).await?;
    ///     db.ensure_schema().await?;
    ///     let store = PgStore::new(db.pool().clone());
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        timeouts::with_long_timeout(sqlx::raw_sql(SCHEMA).execute(&self.pool)).await?;
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StoreResult<()> {
        timeouts::with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_declares_registration_uniqueness() {
        assert!(SCHEMA.contains("uq_registration_tournament_user"));
        assert!(SCHEMA.contains("CREATE TABLE IF NOT EXISTS matches"));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance (DATABASE_URL)"]
    async fn test_database_connection() {
        let config = DatabaseConfig {
            max_connections: 5,
            min_connections: 1,
            ..DatabaseConfig::from_env()
        };

        let db = Database::new(&config)
            .await
            .expect("Failed to connect to database");
        db.ensure_schema().await.expect("Schema setup failed");
        db.health_check().await.expect("Health check failed");
        db.close().await;
    }
}
