//! Cadence HTTP server binary.
//!
//! Loads configuration, builds the tracker client, and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! TRACKER_BASE_URL=https://example.atlassian.net \
//! TRACKER_EMAIL=bot@example.com \
//! TRACKER_API_TOKEN=... \
//!   cargo run --bin cadence-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST` / `PORT`: bind address (default 0.0.0.0:8080)
//! - `TRACKER_BASE_URL`, `TRACKER_EMAIL`, `TRACKER_API_TOKEN`: tracker
//!   credentials (override `cadence.toml`)
//! - `RUST_LOG`: log filter (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use cadence_rust::api::CycleTimeEngine;
use cadence_rust::config::AppConfig;
use cadence_rust::http::{create_router, AppState};
use cadence_rust::tracker::{HistoryProvider, TrackerClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load();
    if !config.tracker.is_complete() {
        anyhow::bail!(
            "missing tracker credentials: set TRACKER_BASE_URL, TRACKER_EMAIL, TRACKER_API_TOKEN or provide cadence.toml"
        );
    }

    let vocabulary = config
        .vocabulary
        .to_vocabulary()
        .map_err(|e| anyhow::anyhow!("invalid vocabulary configuration: {}", e))?;

    let client = Arc::new(
        TrackerClient::new(config.tracker.to_client_config())
            .map_err(|e| anyhow::anyhow!("tracker client init failed: {}", e))?,
    );
    info!("tracker client ready for {}", config.tracker.base_url);

    let provider: Arc<dyn HistoryProvider> = client.clone();
    let state = AppState::new(provider, CycleTimeEngine::new(vocabulary)).with_search(client);

    let addr = listen_addr()?;
    info!("cadence-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}

fn listen_addr() -> anyhow::Result<SocketAddr> {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8080);
    Ok(format!("{}:{}", host, port).parse()?)
}
