//! Tournament API handlers.
//!
//! Reads are public; the caller, when authenticated, only affects the
//! `is_registered` flag. Writes need a token, and the library decides
//! whether the caller's role allows them.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use esports_hub::{
    Caller, TournamentError,
    tournament::{
        Announcement, AnnouncementDraft, ErrorKind, Match, MatchDraft, MatchId, MatchResult,
        MyRegistration, Registration, StandingRow, TournamentDraft, TournamentId,
        TournamentStatus, TournamentSummary,
    },
};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    error::{ApiError, ApiJson},
    middleware::{AuthenticatedCaller, OptionalCaller},
};
use crate::{logging::log_security_event, metrics};

/// Optional join body
#[derive(Debug, Default, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub team_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinResponse {
    pub success: bool,
    pub message: String,
    pub registration: Registration,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: TournamentStatus,
}

/// Convert a domain error, recording role violations as security events
fn reject(caller: &Caller, err: TournamentError) -> ApiError {
    if err.kind() == ErrorKind::Forbidden {
        log_security_event("forbidden", Some(caller.user_id), &err.to_string());
    }
    err.into()
}

/// `GET /tournaments`
pub async fn list_tournaments(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> Result<Json<Vec<TournamentSummary>>, ApiError> {
    let tournaments = state
        .tournament_manager
        .list_tournaments(caller.as_ref())
        .await?;
    Ok(Json(tournaments))
}

/// `POST /tournaments` (admin)
pub async fn create_tournament(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiJson(draft): ApiJson<TournamentDraft>,
) -> Result<(StatusCode, Json<TournamentSummary>), ApiError> {
    let summary = state
        .tournament_manager
        .create_tournament(&caller, draft)
        .await
        .map_err(|e| reject(&caller, e))?;
    metrics::entities_created_total("tournament");
    Ok((StatusCode::CREATED, Json(summary)))
}

/// `GET /tournaments/{id}`
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    OptionalCaller(caller): OptionalCaller,
) -> Result<Json<TournamentSummary>, ApiError> {
    let summary = state
        .tournament_manager
        .get_tournament(tournament_id, caller.as_ref())
        .await?;
    Ok(Json(summary))
}

/// `PATCH /tournaments/{id}/status` (admin)
pub async fn update_status(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiJson(payload): ApiJson<StatusPayload>,
) -> Result<Json<TournamentSummary>, ApiError> {
    let summary = state
        .tournament_manager
        .update_status(&caller, tournament_id, payload.status)
        .await
        .map_err(|e| reject(&caller, e))?;
    Ok(Json(summary))
}

/// `POST /tournaments/{id}/join` (user)
///
/// The body is optional: no body, an empty body and `{}` all fall back to
/// the profile name for the team.
pub async fn join_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    body: Bytes,
) -> Result<Json<JoinResponse>, ApiError> {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        JoinPayload::default()
    } else {
        serde_json::from_slice::<JoinPayload>(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid join request: {e}")))?
    };

    let result = state
        .tournament_manager
        .join(tournament_id, &caller, payload.team_name.as_deref())
        .await;

    match result {
        Ok(registration) => {
            metrics::tournament_joins_total("success");
            Ok(Json(JoinResponse {
                success: true,
                message: "Successfully joined tournament".to_string(),
                registration,
            }))
        }
        Err(e) => {
            metrics::tournament_joins_total(e.kind().code());
            Err(reject(&caller, e))
        }
    }
}

/// `GET /tournaments/me/registrations`
pub async fn my_registrations(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<Vec<MyRegistration>>, ApiError> {
    let registrations = state.tournament_manager.my_registrations(&caller).await?;
    Ok(Json(registrations))
}

/// `GET /tournaments/{id}/participants`
pub async fn participants(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<Registration>>, ApiError> {
    Ok(Json(
        state.tournament_manager.participants(tournament_id).await?,
    ))
}

/// `GET /tournaments/{id}/standings`
pub async fn standings(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<StandingRow>>, ApiError> {
    Ok(Json(state.tournament_manager.standings(tournament_id).await?))
}

/// `GET /tournaments/{id}/matches`
pub async fn list_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<Match>>, ApiError> {
    Ok(Json(
        state.tournament_manager.list_matches(tournament_id).await?,
    ))
}

/// `POST /tournaments/{id}/matches` (admin)
pub async fn create_match(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiJson(draft): ApiJson<MatchDraft>,
) -> Result<(StatusCode, Json<Match>), ApiError> {
    let created = state
        .tournament_manager
        .create_match(&caller, tournament_id, draft)
        .await
        .map_err(|e| reject(&caller, e))?;
    metrics::entities_created_total("match");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /tournaments/{id}/matches/{match_id}/result` (admin)
pub async fn record_result(
    State(state): State<AppState>,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiJson(result): ApiJson<MatchResult>,
) -> Result<Json<Match>, ApiError> {
    let updated = state
        .tournament_manager
        .record_result(tournament_id, match_id, &caller, &result)
        .await
        .map_err(|e| reject(&caller, e))?;
    metrics::match_results_recorded_total(updated.winner.is_some());
    Ok(Json(updated))
}

/// `GET /tournaments/{id}/announcements`
pub async fn list_announcements(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<Announcement>>, ApiError> {
    Ok(Json(
        state
            .tournament_manager
            .list_announcements(tournament_id)
            .await?,
    ))
}

/// `POST /tournaments/{id}/announcements` (admin)
pub async fn create_announcement(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    ApiJson(draft): ApiJson<AnnouncementDraft>,
) -> Result<(StatusCode, Json<Announcement>), ApiError> {
    let announcement = state
        .tournament_manager
        .create_announcement(&caller, tournament_id, draft)
        .await
        .map_err(|e| reject(&caller, e))?;
    metrics::entities_created_total("announcement");
    Ok((StatusCode::CREATED, Json(announcement)))
}
