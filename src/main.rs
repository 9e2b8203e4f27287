use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use immo_scout::api::{self, AppState};
use immo_scout::config::Config;
use immo_scout::store::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("🏠 Immo Scout - aggregated property search");

    let config = Config::from_env().context("Failed to load configuration")?;

    let store = SqliteStore::new(&config.database_url)
        .await
        .context("Failed to open listing store")?;

    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config.clone()),
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, api::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
