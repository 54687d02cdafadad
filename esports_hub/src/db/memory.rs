//! In-memory store.
//!
//! A single async mutex guards the whole state. A transaction holds the guard
//! for its lifetime and works on a copy that replaces the state on commit, so
//! transactions are serializable and an uncommitted one leaves nothing behind.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::errors::{StoreError, StoreResult};
use super::repository::{StoreTx, TournamentStore, UserRepository};
use crate::auth::{NewUser, User, UserCredentials, UserId};
use crate::tournament::{
    Announcement, AnnouncementDraft, Match, MatchDraft, MatchId, MatchResult, MatchStatus,
    NewRegistration, Registration, RegistrationId, Tournament, TournamentDraft, TournamentId,
    TournamentStatus,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserCredentials>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    registrations: BTreeMap<RegistrationId, Registration>,
    matches: BTreeMap<MatchId, Match>,
    announcements: BTreeMap<i64, Announcement>,
    last_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Ephemeral store for tests and `STORAGE_BACKEND=memory`
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|c| c.user.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let created = User {
            id: state.next_id(),
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.insert(
            created.id,
            UserCredentials {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|c| c.user.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&user_id).map(|c| c.user.clone()))
    }
}

/// Transaction over [`MemoryStore`]
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_tournament(
        &mut self,
        draft: &TournamentDraft,
        created_by: Option<UserId>,
    ) -> StoreResult<Tournament> {
        let tournament = Tournament {
            id: self.working.next_id(),
            name: draft.name.clone(),
            game: draft.game.clone(),
            format: draft.format.clone(),
            status: draft.status,
            location: draft.location.clone(),
            description: draft.description.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            prize_pool: draft.prize_pool,
            max_teams: draft.max_teams,
            created_by_user_id: created_by,
            created_at: Utc::now(),
        };
        self.working
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn get_tournament(&mut self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.working.tournaments.get(&id).cloned())
    }

    async fn lock_tournament(&mut self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        // The transaction already holds the store-wide lock
        self.get_tournament(id).await
    }

    async fn list_tournaments(&mut self) -> StoreResult<Vec<Tournament>> {
        let mut tournaments: Vec<Tournament> =
            self.working.tournaments.values().cloned().collect();
        tournaments.sort_by(|a, b| {
            let by_start = match (a.start_date, b.start_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_start
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tournaments)
    }

    async fn update_tournament_status(
        &mut self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> StoreResult<Option<Tournament>> {
        Ok(self.working.tournaments.get_mut(&id).map(|t| {
            t.status = status;
            t.clone()
        }))
    }

    async fn count_registrations(&mut self, tournament_id: TournamentId) -> StoreResult<i64> {
        let count = self
            .working
            .registrations
            .values()
            .filter(|r| r.tournament_id == tournament_id)
            .count();
        Ok(count as i64)
    }

    async fn count_matches(&mut self, tournament_id: TournamentId) -> StoreResult<i64> {
        let count = self
            .working
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .count();
        Ok(count as i64)
    }

    async fn find_registration(
        &mut self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<Option<Registration>> {
        Ok(self
            .working
            .registrations
            .values()
            .find(|r| r.tournament_id == tournament_id && r.user_id == user_id)
            .cloned())
    }

    async fn insert_registration(
        &mut self,
        registration: &NewRegistration,
    ) -> StoreResult<Registration> {
        if !self
            .working
            .tournaments
            .contains_key(&registration.tournament_id)
        {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        let taken = self.working.registrations.values().any(|r| {
            r.tournament_id == registration.tournament_id && r.user_id == registration.user_id
        });
        if taken {
            return Err(StoreError::UniqueViolation(
                "uq_registration_tournament_user".to_string(),
            ));
        }

        let created = Registration {
            id: self.working.next_id(),
            tournament_id: registration.tournament_id,
            user_id: registration.user_id,
            team_name: registration.team_name.clone(),
            status: registration.status,
            points: registration.points,
            created_at: Utc::now(),
        };
        self.working
            .registrations
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_registrations(
        &mut self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Registration>> {
        Ok(self
            .working
            .registrations
            .values()
            .filter(|r| r.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn registrations_for_user(
        &mut self,
        user_id: UserId,
    ) -> StoreResult<Vec<(Registration, Tournament)>> {
        let mut rows: Vec<(Registration, Tournament)> = self
            .working
            .registrations
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                self.working
                    .tournaments
                    .get(&r.tournament_id)
                    .map(|t| (r.clone(), t.clone()))
            })
            .collect();
        rows.sort_by(|(a, _), (b, _)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn find_registration_by_team(
        &mut self,
        tournament_id: TournamentId,
        team_name: &str,
    ) -> StoreResult<Option<Registration>> {
        Ok(self
            .working
            .registrations
            .values()
            .filter(|r| r.tournament_id == tournament_id && r.team_name == team_name)
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned())
    }

    async fn add_points(
        &mut self,
        registration_id: RegistrationId,
        points: i64,
    ) -> StoreResult<()> {
        if let Some(registration) = self.working.registrations.get_mut(&registration_id) {
            registration.points += points;
        }
        Ok(())
    }

    async fn insert_match(
        &mut self,
        tournament_id: TournamentId,
        draft: &MatchDraft,
    ) -> StoreResult<Match> {
        if !self.working.tournaments.contains_key(&tournament_id) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        let created = Match {
            id: self.working.next_id(),
            tournament_id,
            round_name: draft.round_name.clone(),
            team_a: draft.team_a.clone(),
            team_b: draft.team_b.clone(),
            scheduled_at: draft.scheduled_at,
            team_a_score: None,
            team_b_score: None,
            winner: None,
            status: MatchStatus::Scheduled,
            created_at: Utc::now(),
        };
        self.working.matches.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_match(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> StoreResult<Option<Match>> {
        Ok(self
            .working
            .matches
            .get(&match_id)
            .filter(|m| m.tournament_id == tournament_id)
            .cloned())
    }

    async fn update_match_result(
        &mut self,
        match_id: MatchId,
        result: &MatchResult,
        winner: Option<&str>,
    ) -> StoreResult<Option<Match>> {
        Ok(self.working.matches.get_mut(&match_id).map(|m| {
            m.team_a_score = Some(result.team_a_score);
            m.team_b_score = Some(result.team_b_score);
            m.winner = winner.map(str::to_string);
            m.status = MatchStatus::Finished;
            m.clone()
        }))
    }

    async fn list_matches(&mut self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .working
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            a.round_name
                .cmp(&b.round_name)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matches)
    }

    async fn insert_announcement(
        &mut self,
        tournament_id: TournamentId,
        draft: &AnnouncementDraft,
    ) -> StoreResult<Announcement> {
        if !self.working.tournaments.contains_key(&tournament_id) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        let created = Announcement {
            id: self.working.next_id(),
            tournament_id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: Utc::now(),
        };
        self.working
            .announcements
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_announcements(
        &mut self,
        tournament_id: TournamentId,
    ) -> StoreResult<Vec<Announcement>> {
        let mut announcements: Vec<Announcement> = self
            .working
            .announcements
            .values()
            .filter(|a| a.tournament_id == tournament_id)
            .cloned()
            .collect();
        announcements.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(announcements)
    }

    async fn find_user_name(&mut self, user_id: UserId) -> StoreResult<Option<String>> {
        Ok(self
            .working
            .users
            .get(&user_id)
            .map(|c| c.user.name.clone()))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
