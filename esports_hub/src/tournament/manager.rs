//! Tournament manager: the entry point the API layer talks to.

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Announcement, AnnouncementDraft, Match, MatchDraft, MatchId, MatchResult, MyRegistration,
    Registration, StandingRow, Tournament, TournamentDraft, TournamentId, TournamentStatus,
    TournamentSummary,
};
use super::registration::RegistrationManager;
use super::results::ResultRecorder;
use super::standings::{compute_standings, sort_registrations};
use crate::auth::Caller;
use crate::db::{StoreTx, TournamentStore};
use chrono::{Duration, Utc};
use log::info;
use std::sync::Arc;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    store: Arc<dyn TournamentStore>,
    registrations: RegistrationManager,
    results: ResultRecorder,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self {
            registrations: RegistrationManager::new(Arc::clone(&store)),
            results: ResultRecorder::new(Arc::clone(&store)),
            store,
        }
    }

    /// Create a new tournament owned by the calling admin
    pub async fn create_tournament(
        &self,
        caller: &Caller,
        draft: TournamentDraft,
    ) -> TournamentResult<TournamentSummary> {
        require_admin(caller, "Only admins can create tournaments")?;
        draft.validate()?;

        let mut tx = self.store.begin().await?;
        let tournament = tx.insert_tournament(&draft, Some(caller.user_id)).await?;
        tx.commit().await?;

        info!(
            "Created tournament {} '{}' ({}, {} slots)",
            tournament.id, tournament.name, tournament.game, tournament.max_teams
        );

        Ok(TournamentSummary {
            tournament,
            participants_count: 0,
            matches_count: 0,
            is_registered: false,
        })
    }

    /// All tournaments, soonest start first with unscheduled ones last
    pub async fn list_tournaments(
        &self,
        caller: Option<&Caller>,
    ) -> TournamentResult<Vec<TournamentSummary>> {
        let mut tx = self.store.begin().await?;
        let tournaments = tx.list_tournaments().await?;

        let mut summaries = Vec::with_capacity(tournaments.len());
        for tournament in tournaments {
            summaries.push(summarize(tx.as_mut(), tournament, caller).await?);
        }
        Ok(summaries)
    }

    /// Get tournament details with counters
    pub async fn get_tournament(
        &self,
        tournament_id: TournamentId,
        caller: Option<&Caller>,
    ) -> TournamentResult<TournamentSummary> {
        let mut tx = self.store.begin().await?;
        let tournament = tx
            .get_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound("Tournament"))?;

        summarize(tx.as_mut(), tournament, caller).await
    }

    /// Move a tournament to any status
    pub async fn update_status(
        &self,
        caller: &Caller,
        tournament_id: TournamentId,
        status: TournamentStatus,
    ) -> TournamentResult<TournamentSummary> {
        require_admin(caller, "Only admins can update tournament status")?;

        let mut tx = self.store.begin().await?;
        let tournament = tx
            .update_tournament_status(tournament_id, status)
            .await?
            .ok_or(TournamentError::NotFound("Tournament"))?;
        let summary = summarize(tx.as_mut(), tournament, Some(caller)).await?;
        tx.commit().await?;

        info!("Tournament {} moved to {}", tournament_id, status);
        Ok(summary)
    }

    /// Register the caller; see [`RegistrationManager::join`]
    pub async fn join(
        &self,
        tournament_id: TournamentId,
        caller: &Caller,
        team_name: Option<&str>,
    ) -> TournamentResult<Registration> {
        self.registrations
            .join(tournament_id, caller, team_name)
            .await
    }

    /// The caller's registrations, newest first
    pub async fn my_registrations(&self, caller: &Caller) -> TournamentResult<Vec<MyRegistration>> {
        let mut tx = self.store.begin().await?;
        let rows = tx.registrations_for_user(caller.user_id).await?;

        Ok(rows
            .into_iter()
            .map(|(registration, tournament)| MyRegistration::new(registration, &tournament))
            .collect())
    }

    /// Registrations in ranking order
    pub async fn participants(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Registration>> {
        let mut registrations = self.ranked_registrations(tournament_id).await?;
        sort_registrations(&mut registrations);
        Ok(registrations)
    }

    /// Ranked standings of a tournament
    pub async fn standings(&self, tournament_id: TournamentId) -> TournamentResult<Vec<StandingRow>> {
        let registrations = self.ranked_registrations(tournament_id).await?;
        Ok(compute_standings(registrations))
    }

    /// Schedule a match between two named teams
    pub async fn create_match(
        &self,
        caller: &Caller,
        tournament_id: TournamentId,
        draft: MatchDraft,
    ) -> TournamentResult<Match> {
        require_admin(caller, "Only admins can create matches")?;
        draft.validate()?;

        let mut tx = self.store.begin().await?;
        ensure_tournament(tx.as_mut(), tournament_id).await?;
        let created = tx.insert_match(tournament_id, &draft).await?;
        tx.commit().await?;

        info!(
            "Scheduled match {} in tournament {}: {} vs {} ({})",
            created.id, tournament_id, created.team_a, created.team_b, created.round_name
        );
        Ok(created)
    }

    /// Matches ordered by round, then creation time
    pub async fn list_matches(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Match>> {
        let mut tx = self.store.begin().await?;
        ensure_tournament(tx.as_mut(), tournament_id).await?;
        Ok(tx.list_matches(tournament_id).await?)
    }

    /// Record a match result; see [`ResultRecorder::record_result`]
    pub async fn record_result(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        caller: &Caller,
        result: &MatchResult,
    ) -> TournamentResult<Match> {
        self.results
            .record_result(tournament_id, match_id, caller, result)
            .await
    }

    pub async fn create_announcement(
        &self,
        caller: &Caller,
        tournament_id: TournamentId,
        draft: AnnouncementDraft,
    ) -> TournamentResult<Announcement> {
        require_admin(caller, "Only admins can create announcements")?;
        draft.validate()?;

        let mut tx = self.store.begin().await?;
        ensure_tournament(tx.as_mut(), tournament_id).await?;
        let created = tx.insert_announcement(tournament_id, &draft).await?;
        tx.commit().await?;

        info!(
            "Posted announcement {} to tournament {}",
            created.id, tournament_id
        );
        Ok(created)
    }

    /// Announcements, newest first
    pub async fn list_announcements(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Announcement>> {
        let mut tx = self.store.begin().await?;
        ensure_tournament(tx.as_mut(), tournament_id).await?;
        Ok(tx.list_announcements(tournament_id).await?)
    }

    /// Populate an empty store with demo tournaments, matches and
    /// announcements. Returns whether anything was inserted.
    pub async fn seed_sample_data(&self) -> TournamentResult<bool> {
        let mut tx = self.store.begin().await?;
        if !tx.list_tournaments().await?.is_empty() {
            return Ok(false);
        }

        let now = Utc::now();
        let drafts = [
            TournamentDraft {
                format: "Double Elimination".to_string(),
                location: Some("Online".to_string()),
                description: Some(
                    "Regional invitational with live streams and playoffs.".to_string(),
                ),
                start_date: Some(now + Duration::days(7)),
                end_date: Some(now + Duration::days(11)),
                prize_pool: 25_000,
                ..TournamentDraft::new("Valor Clash Invitational", "Valorant")
            },
            TournamentDraft {
                format: "League + Finals".to_string(),
                status: TournamentStatus::Upcoming,
                location: Some("Los Angeles".to_string()),
                description: Some("Season-based points race ending in a LAN final.".to_string()),
                start_date: Some(now + Duration::days(18)),
                end_date: Some(now + Duration::days(21)),
                prize_pool: 50_000,
                max_teams: 20,
                ..TournamentDraft::new("Apex Arena Masters", "Apex Legends")
            },
            TournamentDraft {
                status: TournamentStatus::Live,
                location: Some("Online".to_string()),
                description: Some("Fast weekly cup for rising teams and creators.".to_string()),
                start_date: Some(now - Duration::days(1)),
                end_date: Some(now + Duration::days(1)),
                prize_pool: 5_000,
                max_teams: 8,
                ..TournamentDraft::new("CS2 Night Cup", "Counter-Strike 2")
            },
        ];

        let mut created = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            created.push(tx.insert_tournament(draft, None).await?);
        }
        let (invitational, night_cup) = (created[0].id, created[2].id);

        tx.insert_announcement(
            invitational,
            &AnnouncementDraft::new(
                "Registrations Open",
                "Check-in starts 30 minutes before qualifiers.",
            ),
        )
        .await?;
        tx.insert_announcement(
            night_cup,
            &AnnouncementDraft::new(
                "Live Broadcast",
                "Main stage is streaming with caster desk analysis.",
            ),
        )
        .await?;

        for (team_a, team_b, hours) in [
            ("Nova Squad", "Iron Hawks", 4),
            ("Pixel Storm", "Zenith Five", 6),
        ] {
            let draft = MatchDraft {
                scheduled_at: Some(now + Duration::hours(hours)),
                ..MatchDraft::new(team_a, team_b).in_round("Quarterfinals")
            };
            tx.insert_match(night_cup, &draft).await?;
        }

        tx.commit().await?;
        info!("Seeded {} sample tournaments", created.len());
        Ok(true)
    }

    async fn ranked_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Registration>> {
        let mut tx = self.store.begin().await?;
        ensure_tournament(tx.as_mut(), tournament_id).await?;
        Ok(tx.list_registrations(tournament_id).await?)
    }
}

fn require_admin(caller: &Caller, message: &'static str) -> TournamentResult<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(TournamentError::Forbidden(message))
    }
}

async fn ensure_tournament(
    tx: &mut dyn StoreTx,
    tournament_id: TournamentId,
) -> TournamentResult<Tournament> {
    tx.get_tournament(tournament_id)
        .await?
        .ok_or(TournamentError::NotFound("Tournament"))
}

async fn summarize(
    tx: &mut dyn StoreTx,
    tournament: Tournament,
    caller: Option<&Caller>,
) -> TournamentResult<TournamentSummary> {
    let participants_count = tx.count_registrations(tournament.id).await?;
    let matches_count = tx.count_matches(tournament.id).await?;
    let is_registered = match caller {
        Some(caller) => tx
            .find_registration(tournament.id, caller.user_id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(TournamentSummary {
        tournament,
        participants_count,
        matches_count,
        is_registered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::db::MemoryStore;

    fn manager() -> TournamentManager {
        TournamentManager::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_only_admins_create_tournaments() {
        let manager = manager();
        let user = Caller::new(2, Role::User);

        let result = manager
            .create_tournament(&user, TournamentDraft::new("Night Cup", "CS2"))
            .await;
        assert!(matches!(result, Err(TournamentError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_orders_by_start_then_newest() {
        let manager = manager();
        let admin = Caller::new(1, Role::Admin);
        let now = Utc::now();

        let later = manager
            .create_tournament(
                &admin,
                TournamentDraft::new("Later Cup", "CS2")
                    .with_schedule(Some(now + Duration::days(5)), None),
            )
            .await
            .unwrap();
        let unscheduled = manager
            .create_tournament(&admin, TournamentDraft::new("Someday Cup", "CS2"))
            .await
            .unwrap();
        let sooner = manager
            .create_tournament(
                &admin,
                TournamentDraft::new("Sooner Cup", "CS2")
                    .with_schedule(Some(now + Duration::days(1)), None),
            )
            .await
            .unwrap();

        let ids: Vec<TournamentId> = manager
            .list_tournaments(None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.tournament.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                sooner.tournament.id,
                later.tournament.id,
                unscheduled.tournament.id
            ]
        );
    }

    #[tokio::test]
    async fn test_seed_only_fills_empty_store() {
        let manager = manager();
        assert!(manager.seed_sample_data().await.unwrap());
        assert!(!manager.seed_sample_data().await.unwrap());

        let tournaments = manager.list_tournaments(None).await.unwrap();
        assert_eq!(tournaments.len(), 3);

        let night_cup = tournaments
            .iter()
            .find(|s| s.tournament.name == "CS2 Night Cup")
            .unwrap();
        assert_eq!(night_cup.tournament.status, TournamentStatus::Live);
        assert_eq!(night_cup.matches_count, 2);

        let announcements = manager
            .list_announcements(night_cup.tournament.id)
            .await
            .unwrap();
        assert_eq!(announcements.len(), 1);
        assert_eq!(announcements[0].title, "Live Broadcast");
    }

    #[tokio::test]
    async fn test_update_status_requires_existing_tournament() {
        let manager = manager();
        let admin = Caller::new(1, Role::Admin);

        let result = manager
            .update_status(&admin, 999, TournamentStatus::Live)
            .await;
        assert!(matches!(result, Err(TournamentError::NotFound("Tournament"))));
    }
}
