//! Registration manager: admits participants into tournaments.

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    NewRegistration, Registration, RegistrationStatus, TournamentId, TournamentStatus,
    check_length,
};
use crate::auth::{Caller, Role, UserId};
use crate::db::{StoreError, TournamentStore};
use log::{info, warn};
use std::sync::Arc;

/// Enforces the admission rules for [`RegistrationManager::join`]
#[derive(Clone)]
pub struct RegistrationManager {
    store: Arc<dyn TournamentStore>,
}

impl RegistrationManager {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    /// Register the caller for a tournament
    ///
    /// Checks run in this order and the first failure is returned:
    /// participant role, tournament exists, tournament not completed, not
    /// already registered, capacity left. The checks and the insert share one
    /// transaction holding the tournament lock, so concurrent joins can never
    /// push a tournament past `max_teams`.
    ///
    /// # Errors
    ///
    /// * `TournamentError::Forbidden` - Caller is not a participant
    /// * `TournamentError::NotFound` - Unknown tournament
    /// * `TournamentError::InvalidState` - Tournament completed
    /// * `TournamentError::AlreadyRegistered` - Caller already holds a registration
    /// * `TournamentError::TournamentFull` - No slots left
    /// * `TournamentError::Validation` - Requested team name out of bounds
    pub async fn join(
        &self,
        tournament_id: TournamentId,
        caller: &Caller,
        team_name: Option<&str>,
    ) -> TournamentResult<Registration> {
        if caller.role != Role::User {
            return Err(TournamentError::Forbidden(
                "Only users can join tournaments",
            ));
        }

        let mut tx = self.store.begin().await?;

        let tournament = tx
            .lock_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound("Tournament"))?;

        if tournament.status == TournamentStatus::Completed {
            warn!(
                "User {} tried to join completed tournament {}",
                caller.user_id, tournament_id
            );
            return Err(TournamentError::InvalidState(tournament.status));
        }

        if tx
            .find_registration(tournament_id, caller.user_id)
            .await?
            .is_some()
        {
            return Err(TournamentError::AlreadyRegistered);
        }

        let registered = tx.count_registrations(tournament_id).await?;
        if registered >= tournament.max_teams {
            warn!(
                "Tournament {} is full ({}/{}), rejecting user {}",
                tournament_id, registered, tournament.max_teams, caller.user_id
            );
            return Err(TournamentError::TournamentFull {
                capacity: tournament.max_teams,
            });
        }

        let profile_name = tx.find_user_name(caller.user_id).await?;
        let team_name = resolve_team_name(team_name, profile_name.as_deref(), caller.user_id)?;

        let registration = tx
            .insert_registration(&NewRegistration {
                tournament_id,
                user_id: caller.user_id,
                team_name,
                status: RegistrationStatus::Registered,
                points: 0,
            })
            .await
            .map_err(|e: StoreError| {
                if e.is_unique_violation() {
                    TournamentError::AlreadyRegistered
                } else {
                    TournamentError::Store(e)
                }
            })?;

        tx.commit().await?;

        info!(
            "User {} joined tournament {} as '{}' ({}/{})",
            caller.user_id,
            tournament_id,
            registration.team_name,
            registered + 1,
            tournament.max_teams
        );

        Ok(registration)
    }
}

/// Team name for a new registration
///
/// A non-blank requested name wins (trimmed, 2..=255 characters). Otherwise
/// the caller's profile name, and `Team-{user_id}` when that is empty too.
pub fn resolve_team_name(
    requested: Option<&str>,
    profile_name: Option<&str>,
    user_id: UserId,
) -> TournamentResult<String> {
    if let Some(requested) = requested.map(str::trim).filter(|n| !n.is_empty()) {
        check_length("team_name", requested, 2, 255)?;
        return Ok(requested.to_string());
    }

    Ok(profile_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Team-{user_id}")))
}
