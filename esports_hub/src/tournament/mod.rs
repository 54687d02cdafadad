//! Tournament lifecycle: registration, match results and standings.
//!
//! - [`RegistrationManager`] admits participants while enforcing capacity,
//!   uniqueness and lifecycle status
//! - [`ResultRecorder`] stores match outcomes and credits the winner's
//!   registration with [`WIN_POINTS`]
//! - [`compute_standings`] ranks registrations by points
//! - [`TournamentManager`] is the facade that also covers tournament, match
//!   and announcement CRUD
//!
//! ## Example
//!
//! ```
//! use esports_hub::auth::{Caller, Role};
//! use esports_hub::db::MemoryStore;
//! use esports_hub::tournament::{MatchDraft, MatchResult, TournamentDraft, TournamentManager};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = TournamentManager::new(Arc::new(MemoryStore::new()));
//! let admin = Caller::new(1, Role::Admin);
//!
//! let cup = manager
//!     .create_tournament(&admin, TournamentDraft::new("Night Cup", "CS2"))
//!     .await?;
//! let id = cup.tournament.id;
//!
//! manager.join(id, &Caller::new(2, Role::User), Some("Nova Squad")).await?;
//! manager.join(id, &Caller::new(3, Role::User), Some("Iron Hawks")).await?;
//!
//! let m = manager
//!     .create_match(&admin, id, MatchDraft::new("Nova Squad", "Iron Hawks"))
//!     .await?;
//! manager
//!     .record_result(id, m.id, &admin, &MatchResult::new(13, 9))
//!     .await?;
//!
//! let standings = manager.standings(id).await?;
//! assert_eq!(standings[0].team_name, "Nova Squad");
//! assert_eq!(standings[0].points, 3);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod registration;
pub mod results;
pub mod standings;

pub use errors::{ErrorKind, TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    Announcement, AnnouncementDraft, AnnouncementId, DEFAULT_FORMAT, DEFAULT_MAX_TEAMS,
    DEFAULT_ROUND_NAME, Match, MatchDraft, MatchId, MatchResult, MatchStatus, MyRegistration,
    NewRegistration, Registration, RegistrationId, RegistrationStatus, StandingRow, Tournament,
    TournamentDraft, TournamentId, TournamentStatus, TournamentSummary, WIN_POINTS,
};
pub use registration::{RegistrationManager, resolve_team_name};
pub use results::ResultRecorder;
pub use standings::{compute_standings, ranking_order, sort_registrations};
