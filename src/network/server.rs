//! HTTP Scoreboard Server
//!
//! Axum router exposing the score store:
//!
//! - `GET /scoreboard/{level}` - ranked records for a level, no auth
//! - `POST /scoreboard/submit` - submit a time, requires `X-API-Key`

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use crate::network::auth::{ApiKey, API_KEY_HEADER, DEFAULT_API_KEY};
use crate::network::protocol::{ApiError, ScoreSubmission, SubmitAck};
use crate::store::{Level, ScoreRecord, ScoreStore, SubmitOutcome};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Origins allowed to make cross-origin requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `*`: any origin, mirrored back so credentials still work.
    Any,
    /// Explicit origin list. Empty allows no cross-origin callers.
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parse a comma-separated origin list. An empty value allows no origins.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let entries: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if entries.contains(&"*") {
            return Ok(AllowedOrigins::Any);
        }

        entries
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AllowedOrigins::List)
    }

    /// CORS layer allowing these origins with credentials, any method and any header.
    pub fn cors_layer(&self) -> CorsLayer {
        let origin = match self {
            AllowedOrigins::Any => AllowOrigin::mirror_request(),
            AllowedOrigins::List(list) => AllowOrigin::list(list.clone()),
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `BIND_ADDR` is not a socket address.
    #[error("invalid BIND_ADDR {0:?}")]
    InvalidBindAddr(String),

    /// An `ALLOW_ORIGINS` entry is not a valid header value.
    #[error("invalid origin in ALLOW_ORIGINS: {0:?}")]
    InvalidOrigin(String),

    /// A dotenv file could not be read or parsed.
    #[error("invalid env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// CORS origins.
    pub allow_origins: AllowedOrigins,
    /// Shared secret for writes.
    pub api_key: ApiKey,
    /// Persisted score table.
    pub score_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            allow_origins: AllowedOrigins::Any,
            api_key: ApiKey::new(DEFAULT_API_KEY),
            score_file: PathBuf::from("scoreboard.json"),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from a dotenv file layered under the process environment.
    ///
    /// Variables already set in the environment win over the file.
    pub fn from_env_file(path: &FsPath) -> Result<Self, ConfigError> {
        let file_vars = dotenvy::from_path_iter(path)?
            .collect::<Result<HashMap<String, String>, _>>()?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Create config from any key lookup. Unset keys use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddr(raw))?,
            None => defaults.bind_addr,
        };

        let allow_origins = match lookup("ALLOW_ORIGINS") {
            Some(raw) => AllowedOrigins::parse(&raw)?,
            None => defaults.allow_origins,
        };

        let api_key = lookup("API_KEY")
            .map(|secret| ApiKey::new(&secret))
            .unwrap_or(defaults.api_key);

        let score_file = lookup("SCOREBOARD_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.score_file);

        Ok(Self {
            bind_addr,
            allow_origins,
            api_key,
            score_file,
        })
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Score store.
    pub store: Arc<ScoreStore>,
    /// Shared secret for writes.
    pub api_key: ApiKey,
}

/// Build the scoreboard router (without CORS or tracing layers).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scoreboard/submit", post(submit_score).get(submit_is_not_a_level))
        .route("/scoreboard/{level}", get(scoreboard_list))
        .with_state(state)
}

/// Build the full application: routes plus CORS and request tracing.
pub fn app(state: AppState, origins: &AllowedOrigins) -> Router {
    router(state)
        .layer(origins.cors_layer())
        .layer(TraceLayer::new_for_http())
}

async fn scoreboard_list(
    State(state): State<AppState>,
    level: Result<Path<Level>, PathRejection>,
) -> Result<Json<Vec<ScoreRecord>>, ApiError> {
    let Path(level) = level?;
    let records = state.store.list_by_level(level).await;
    debug!("Level {}: {} records", level, records.len());
    Ok(Json(records))
}

/// `GET /scoreboard/submit` reads "submit" as a level, which never parses.
async fn submit_is_not_a_level() -> ApiError {
    ApiError::Validation("Invalid URL: Cannot parse `submit` to a `i64`".to_string())
}

#[instrument(skip_all)]
async fn submit_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ScoreSubmission>, JsonRejection>,
) -> Result<Json<SubmitAck>, ApiError> {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = state.api_key.verify(presented) {
        warn!("Rejected submission: {}", e);
        return Err(e.into());
    }

    let Json(submission) = payload?;
    let record = ScoreRecord::from(submission);
    let (level, player) = (record.level, record.player_name.clone());
    let time = record.time;

    match state.store.submit(record).await? {
        SubmitOutcome::Inserted => {
            info!(level, player = %player, time, "New record");
        }
        SubmitOutcome::Improved { previous } => {
            info!(level, player = %player, time, previous, "Improved record");
        }
    }

    Ok(Json(SubmitAck::success()))
}

// =============================================================================
// SERVER
// =============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        /// Address requested.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Server loop failed.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Serve until Ctrl-C.
#[instrument(skip_all, fields(addr = %config.bind_addr))]
pub async fn run(config: ServerConfig, store: Arc<ScoreStore>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|source| ServerError::BindFailed { addr: config.bind_addr, source })?;

    let state = AppState {
        store,
        api_key: config.api_key.clone(),
    };
    let app = app(state, &config.allow_origins);

    info!("Scoreboard server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Scoreboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// =============================================================================
// TESTS
// =============================================================================
