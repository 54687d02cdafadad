//! # Esports Hub
//!
//! Tournament lifecycle and standings engine for an esports tournament backend.
//!
//! The library is independent of any web framework. It exposes domain services
//! that work against a transactional store abstraction, so the same rules apply
//! whether the data lives in PostgreSQL or in memory.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Registration manager, match result recorder, standings
//!   calculator and the [`TournamentManager`] facade over them
//! - [`db`]: Store traits plus PostgreSQL and in-memory implementations
//! - [`auth`]: Mock authentication with explicit roles and JWT access tokens
//! - [`rating`]: Stateless ELO rating and match prediction utilities
//!
//! ## Example
//!
//! ```
//! use esports_hub::{
//!     auth::{Caller, Role},
//!     db::MemoryStore,
//!     tournament::{TournamentDraft, TournamentManager},
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = TournamentManager::new(Arc::new(MemoryStore::new()));
//! let admin = Caller::new(1, Role::Admin);
//!
//! let summary = manager
//!     .create_tournament(&admin, TournamentDraft::new("Spring Cup", "Valorant"))
//!     .await?;
//! assert_eq!(summary.participants_count, 0);
//! # Ok(())
//! # }
//! ```

/// Authentication, roles and caller identity.
pub mod auth;

/// Persistence: store traits, PostgreSQL and in-memory backends.
pub mod db;

/// ELO rating updates and match predictions.
pub mod rating;

/// Tournament lifecycle and standings.
pub mod tournament;

pub use auth::{AuthManager, Caller, Role};
pub use tournament::{TournamentError, TournamentManager, TournamentResult};
