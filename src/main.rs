// src/main.rs
use anyhow::Result;
use dotenvy::dotenv;
use sentinel_bot::config::AppConfig;
use sentinel_bot::connectors::bybit::BybitClient;
use sentinel_bot::connectors::traits::ExchangeGateway;
use sentinel_bot::core::orchestrator::Orchestrator;
use sentinel_bot::server::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let client = BybitClient::new(
        config.bybit_api_key.clone(),
        config.bybit_api_secret.clone(),
        config.base_url().to_string(),
    )?;

    // Connectivity probe; startup proceeds either way.
    match client.server_time().await {
        Ok(time) => info!("✓ Connected to Bybit {} (server time {})", config.network_name(), time),
        Err(e) => warn!("exchange connectivity check failed: {e}"),
    }

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(client)));
    let state = AppState {
        orchestrator,
        config: Arc::new(config.clone()),
    };

    let addr = format!("{}:{}", config.host, config.port);
    info!("listening on {addr} ({})", config.network_name());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
