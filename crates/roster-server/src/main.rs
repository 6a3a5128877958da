//! Server binary for the Roster student/course tracker.
//!
//! Wires configuration, logging, the repository and the HTTP API together
//! and serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load `.env` into the process environment
//! 2. Load configuration from `roster-config.yaml` and apply env overrides
//! 3. Initialize structured logging (tracing)
//! 4. Build the repository (`PostgreSQL` pool, or in-memory)
//! 5. Build statistics options and application state
//! 6. Serve the API until shutdown
//! 7. Close the pool

mod config;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use roster_api::AppState;
use roster_db::{MemoryRepository, PgRepository, PostgresPool, Repository};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Backend, LoggingSection, RosterConfig};
use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the database connection, or the
/// HTTP server fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load .env (absence is fine).
    let env_file = dotenv::dotenv();

    // 2. Load configuration.
    let config_path = config::config_path();
    let file_found = config_path.exists();
    let mut config = if file_found {
        RosterConfig::from_file(&config_path)?
    } else {
        RosterConfig::default()
    };
    config.apply_env_overrides()?;

    // 3. Initialize structured logging.
    init_logging(&config.logging);

    info!("roster-server starting");
    log_env_file(&env_file);
    if file_found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 4. Build the repository.
    let (repo, pool): (Arc<dyn Repository>, Option<PostgresPool>) = match config.database.backend {
        Backend::Postgres => {
            let pool = PostgresPool::connect(&config.database.to_postgres_config()).await?;
            let repo: Arc<dyn Repository> = Arc::new(PgRepository::new(pool.clone()));
            (repo, Some(pool))
        }
        Backend::Memory => {
            warn!("Using the in-memory store; data is lost on exit");
            let repo: Arc<dyn Repository> = Arc::new(MemoryRepository::new());
            (repo, None)
        }
    };

    // 5. Application state.
    let stats = config.stats.to_options();
    info!(
        count_policy = ?stats.count_policy,
        fallback = ?stats.fallback,
        "Statistics options"
    );
    let state = Arc::new(AppState::new(repo).with_stats_options(stats));

    // 6. Serve.
    let served = roster_api::start_server(&config.server.to_server_config(), state).await;

    // 7. Close the pool whether or not serving succeeded.
    if let Some(pool) = pool {
        pool.close().await;
    }

    served?;
    info!("roster-server stopped");
    Ok(())
}

/// Outcome of loading `.env`.
#[derive(Debug)]
enum EnvFile<'a> {
    Loaded(&'a Path),
    Missing,
    /// The file exists but could not be read or parsed. Variables before
    /// the bad line may already be set.
    Broken(&'a dotenv::Error),
}

impl<'a> EnvFile<'a> {
    fn classify(result: &'a Result<PathBuf, dotenv::Error>) -> Self {
        match result {
            Ok(path) => Self::Loaded(path),
            Err(e) if e.not_found() => Self::Missing,
            Err(e) => Self::Broken(e),
        }
    }
}

/// Report the `.env` outcome once logging is up.
fn log_env_file(result: &Result<PathBuf, dotenv::Error>) {
    match EnvFile::classify(result) {
        EnvFile::Loaded(path) => info!(path = %path.display(), "Loaded .env"),
        EnvFile::Missing => info!("No .env file found"),
        EnvFile::Broken(e) => warn!(error = %e, "Failed to load .env"),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(logging.json.then(|| fmt::layer().json().with_target(true)))
        .with((!logging.json).then(|| fmt::layer().with_target(true)))
        .init();
}
