//! Esports tournament hub server.
//!
//! Serves the JSON API over axum, backed by PostgreSQL or, for local
//! development, an in-memory store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use eh_server::{
    api,
    config::{ServerConfig, StorageBackend},
    logging, metrics,
};
use esports_hub::{
    AuthManager, TournamentManager,
    db::{Database, MemoryStore, PgStore, TournamentStore, UserRepository},
};
use log::{error, info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Run the esports tournament hub server

USAGE:
  eh_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/esports_hub]

FLAGS:
  --memory                 Use the in-memory store (data is lost on exit)
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  DATABASE_URL             PostgreSQL connection string
  STORAGE_BACKEND          postgres | memory
  JWT_SECRET               JWT signing secret (>= 32 chars)
  PASSWORD_PEPPER          Password hashing pepper (>= 16 chars)
  TOKEN_TTL_HOURS          Access token lifetime
  SEED_SAMPLE_DATA         Insert demo tournaments into an empty store
  METRICS_BIND             Prometheus exporter address
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let force_memory = pargs.contains("--memory");

    logging::init();

    let config = ServerConfig::from_env(bind, database_url, force_memory)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exported on http://{}/metrics", addr);
    }

    let (store, users, database): (
        Arc<dyn TournamentStore>,
        Arc<dyn UserRepository>,
        Option<Database>,
    ) = match config.storage {
        StorageBackend::Postgres => {
            info!("Connecting to database: {}", config.database.database_url);
            let db = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.ensure_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to apply schema: {}", e))?;
            info!("Database connected successfully");

            let pg = Arc::new(PgStore::new(db.pool().clone()));
            (pg.clone(), pg, Some(db))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store; data will be lost on shutdown");
            let memory = Arc::new(MemoryStore::new());
            (memory.clone(), memory, None)
        }
    };

    let auth_manager = AuthManager::new(
        users,
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
    )
    .with_token_duration(chrono::Duration::hours(config.security.token_ttl_hours));
    let seeded_users = auth_manager.seed_default_users().await?;
    info!("Default accounts ready ({} created)", seeded_users);

    let tournament_manager = TournamentManager::new(Arc::clone(&store));
    if config.seed_sample_data {
        match tournament_manager.seed_sample_data().await {
            Ok(true) => info!("Inserted sample tournaments"),
            Ok(false) => info!("Store already has tournaments; skipping sample data"),
            Err(e) => error!("Failed to seed sample data: {}", e),
        }
    }

    let api_state = api::AppState {
        auth_manager: Arc::new(auth_manager),
        tournament_manager: Arc::new(tournament_manager),
        store,
    };
    let app = api::create_router(api_state);

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
