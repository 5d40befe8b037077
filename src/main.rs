//! Scoreboard Server
//!
//! Loads the persisted score table and serves it over HTTP.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use scoreboard::{network, ScoreStore, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Real environment variables win over .env
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scoreboard=info,tower_http=info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Scoreboard Server v{}", VERSION);

    let config = ServerConfig::from_env().context("invalid configuration")?;
    info!("API key fingerprint: {}", config.api_key.fingerprint());
    if config.api_key.is_default() {
        warn!("API_KEY not set, using the built-in default secret");
    }

    let store = ScoreStore::open(&config.score_file)
        .await
        .with_context(|| format!("failed to open {}", config.score_file.display()))?;

    network::run(config, Arc::new(store)).await?;
    Ok(())
}
