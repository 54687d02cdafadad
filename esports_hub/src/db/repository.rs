//! Repository trait definitions.
//!
//! The lifecycle services depend on these traits only, so the same rules run
//! against PostgreSQL in production and against [`super::MemoryStore`] in tests.

use async_trait::async_trait;

use super::errors::StoreResult;
use crate::auth::{NewUser, User, UserCredentials, UserId};
use crate::tournament::{
    Announcement, AnnouncementDraft, Match, MatchDraft, MatchId, MatchResult, NewRegistration,
    Registration, RegistrationId, Tournament, TournamentDraft, TournamentId, TournamentStatus,
};

/// Entry point for tournament persistence
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Open a transaction. Everything done through the returned handle is
    /// applied atomically on [`StoreTx::commit`] and discarded when the
    /// handle is dropped uncommitted.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    /// Cheap round trip to the backing store
    async fn health_check(&self) -> StoreResult<()>;
}

/// Unit of work over tournaments, registrations, matches and announcements
#[async_trait]
pub trait StoreTx: Send {
    /// Insert a tournament created by `created_by`
    async fn insert_tournament(
        &mut self,
        draft: &TournamentDraft,
        created_by: Option<UserId>,
    ) -> StoreResult<Tournament>;

    /// Read a tournament
    async fn get_tournament(&mut self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    /// Read a tournament and hold its row lock until the transaction ends
    async fn lock_tournament(&mut self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    /// All tournaments by start date (unset last), then newest first
    async fn list_tournaments(&mut self) -> StoreResult<Vec<Tournament>>;

    async fn update_tournament_status(
        &mut self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> StoreResult<Option<Tournament>>;

    async fn count_registrations(&mut self, tournament_id: TournamentId) -> StoreResult<i64>;

    async fn count_matches(&mut self, tournament_id: TournamentId) -> StoreResult<i64>;

    async fn find_registration(
        &mut self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<Option<Registration>>;

    /// Insert a registration.
    ///
    /// Fails with a unique violation when the user already holds one for the
    /// tournament.
    async fn insert_registration(
        &mut self,
        registration: &NewRegistration,
    ) -> StoreResult<Registration>;

    /// Registrations of a tournament in insertion order
    async fn list_registrations(
        &mut self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Registration>>;

    /// A user's registrations with their tournaments, newest first
    async fn registrations_for_user(
        &mut self,
        user_id: UserId,
    ) -> StoreResult<Vec<(Registration, Tournament)>>;

    /// Earliest registration (by creation time, then id) whose team name
    /// matches exactly
    async fn find_registration_by_team(
        &mut self,
        tournament_id: TournamentId,
        team_name: &str,
    ) -> StoreResult<Option<Registration>>;

    async fn add_points(&mut self, registration_id: RegistrationId, points: i64)
    -> StoreResult<()>;

    async fn insert_match(
        &mut self,
        tournament_id: TournamentId,
        draft: &MatchDraft,
    ) -> StoreResult<Match>;

    /// Read a match, only if it belongs to `tournament_id`
    async fn find_match(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> StoreResult<Option<Match>>;

    /// Store scores and winner and mark the match finished
    async fn update_match_result(
        &mut self,
        match_id: MatchId,
        result: &MatchResult,
        winner: Option<&str>,
    ) -> StoreResult<Option<Match>>;

    /// Matches by round name, then creation time
    async fn list_matches(&mut self, tournament_id: TournamentId) -> StoreResult<Vec<Match>>;

    async fn insert_announcement(
        &mut self,
        tournament_id: TournamentId,
        draft: &AnnouncementDraft,
    ) -> StoreResult<Announcement>;

    /// Announcements, newest first
    async fn list_announcements(
        &mut self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Announcement>>;

    /// Profile name of a user account
    async fn find_user_name(&mut self, user_id: UserId) -> StoreResult<Option<String>>;

    /// Apply every change made through this handle
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Trait for user account persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Fails with a unique violation on a taken email.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Find user and password hash by (normalized) email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>>;
}
