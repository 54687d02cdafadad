//! HTTP API for the tournament server.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login (generic and role-scoped), logout
//! - [`tournaments`]: Tournaments, registrations, matches, standings, announcements
//! - [`ratings`]: ELO updates and match predictions
//! - [`middleware`]: Bearer-token identity and caller extractors
//! - [`request_id`]: Request correlation, access logging, HTTP metrics
//! - [`error`]: Error responses
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use eh_server::api::{create_router, AppState};
//! use esports_hub::{AuthManager, TournamentManager, db::MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(
//!         store.clone(),
//!         "pepper".to_string(),
//!         "secret".to_string(),
//!     )),
//!     tournament_manager: Arc::new(TournamentManager::new(store.clone())),
//!     store,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod ratings;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
};
use esports_hub::{AuthManager, TournamentManager, db::TournamentStore};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// - `auth_manager`: Accounts and JWT tokens
/// - `tournament_manager`: Every tournament operation
/// - `store`: Backing store, used for health checks
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub tournament_manager: Arc<TournamentManager>,
    pub store: Arc<dyn TournamentStore>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET   /health
/// POST  /api/v1/auth/register
/// POST  /api/v1/auth/login
/// POST  /api/v1/auth/login/admin
/// POST  /api/v1/auth/login/user
/// POST  /api/v1/auth/logout                               (token)
/// GET   /api/v1/tournaments
/// POST  /api/v1/tournaments                               (admin)
/// GET   /api/v1/tournaments/me/registrations              (token)
/// GET   /api/v1/tournaments/{id}
/// PATCH /api/v1/tournaments/{id}/status                   (admin)
/// POST  /api/v1/tournaments/{id}/join                     (user)
/// GET   /api/v1/tournaments/{id}/participants
/// GET   /api/v1/tournaments/{id}/standings
/// GET   /api/v1/tournaments/{id}/matches
/// POST  /api/v1/tournaments/{id}/matches                  (admin)
/// PATCH /api/v1/tournaments/{id}/matches/{match_id}/result (admin)
/// GET   /api/v1/tournaments/{id}/announcements
/// POST  /api/v1/tournaments/{id}/announcements            (admin)
/// POST  /api/v1/predictions
/// POST  /api/v1/predictions/batch
/// POST  /api/v1/ratings/update
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/login/admin", post(auth::login_admin))
        .route("/auth/login/user", post(auth::login_user))
        .route("/auth/logout", post(auth::logout));

    let tournament_routes = Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/tournaments/me/registrations",
            get(tournaments::my_registrations),
        )
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route("/tournaments/{id}/status", patch(tournaments::update_status))
        .route("/tournaments/{id}/join", post(tournaments::join_tournament))
        .route(
            "/tournaments/{id}/participants",
            get(tournaments::participants),
        )
        .route("/tournaments/{id}/standings", get(tournaments::standings))
        .route(
            "/tournaments/{id}/matches",
            get(tournaments::list_matches).post(tournaments::create_match),
        )
        .route(
            "/tournaments/{id}/matches/{match_id}/result",
            patch(tournaments::record_result),
        )
        .route(
            "/tournaments/{id}/announcements",
            get(tournaments::list_announcements).post(tournaments::create_announcement),
        );

    let rating_routes = Router::new()
        .route("/predictions", post(ratings::predict))
        .route("/predictions/batch", post(ratings::predict_batch))
        .route("/ratings/update", post(ratings::update_ratings));

    Router::new()
        .merge(auth_routes)
        .merge(tournament_routes)
        .merge(rating_routes)
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::identity_middleware,
        ))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","version":"1.0.0","database":true,"timestamp":"2026-01-10T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
