// Main entry point for API server

use anyhow::{Context, Result};
use server_core::{
    server::{build_app, build_state},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,verification=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting trusted-source verification API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let state = build_state(&config).context("Failed to build services")?;
    tracing::info!(
        trusted_domains = state.registry.len(),
        concurrency = config.crawl_concurrency,
        "Services ready"
    );

    let app = build_app(state, &config.allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
