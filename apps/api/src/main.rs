mod analysis_client;
mod config;
mod errors;
mod routes;
mod segmentation;
mod state;
mod suggestions;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis_client::AnalysisClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize analysis service client
    let client = AnalysisClient::new(
        &config.analysis_service_url,
        Duration::from_secs(config.analysis_timeout_secs),
    )?;
    info!(
        "Analysis client initialized ({}, timeout {}s)",
        config.analysis_service_url, config.analysis_timeout_secs
    );

    let state = AppState {
        suggestions: Arc::new(client),
    };

    // The browser front-end is served from a different origin.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
