//! Match result recorder.

use super::errors::{TournamentError, TournamentResult};
use super::models::{Match, MatchId, MatchResult, TournamentId, WIN_POINTS};
use crate::auth::Caller;
use crate::db::TournamentStore;
use log::{debug, info};
use std::sync::Arc;

/// Records match scores and credits the winning registration
#[derive(Clone)]
pub struct ResultRecorder {
    store: Arc<dyn TournamentStore>,
}

impl ResultRecorder {
    pub fn new(store: Arc<dyn TournamentStore>) -> Self {
        Self { store }
    }

    /// Record the outcome of a match
    ///
    /// The match row and the point award commit together. Submitting a result
    /// again overwrites the match and awards [`WIN_POINTS`] again; earlier
    /// awards are never reversed.
    ///
    /// # Errors
    ///
    /// * `TournamentError::Forbidden` - Caller is not an admin
    /// * `TournamentError::NotFound` - Unknown tournament, or match not in it
    /// * `TournamentError::Validation` - Negative score
    pub async fn record_result(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        caller: &Caller,
        result: &MatchResult,
    ) -> TournamentResult<Match> {
        if !caller.is_admin() {
            return Err(TournamentError::Forbidden("Only admins can update results"));
        }

        let mut tx = self.store.begin().await?;

        tx.lock_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound("Tournament"))?;

        let existing = tx
            .find_match(tournament_id, match_id)
            .await?
            .ok_or(TournamentError::NotFound("Match"))?;

        result.validate()?;

        let winner = result.resolve_winner(&existing);

        let updated = tx
            .update_match_result(match_id, result, winner.as_deref())
            .await?
            .ok_or(TournamentError::NotFound("Match"))?;

        if let Some(winner) = winner.as_deref() {
            match tx.find_registration_by_team(tournament_id, winner).await? {
                Some(registration) => {
                    tx.add_points(registration.id, WIN_POINTS).await?;
                    info!(
                        "Awarded {} points to registration {} ('{}') in tournament {}",
                        WIN_POINTS, registration.id, winner, tournament_id
                    );
                }
                None => debug!(
                    "No registration named '{}' in tournament {}, no points awarded",
                    winner, tournament_id
                ),
            }
        }

        tx.commit().await?;

        info!(
            "Recorded result for match {} in tournament {}: {}-{}",
            match_id, tournament_id, result.team_a_score, result.team_b_score
        );

        Ok(updated)
    }
}
