//! Vessel Server - route fuel consumption estimates over HTTP

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vessel_server::config::Config;
use vessel_server::state::AppState;
use vessel_server::weather::WeatherClient;
use vessel_server::{api, persistence};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("vessel_server=debug".parse()?))
        .init();

    tracing::info!("Starting Vessel Server...");

    let config = Config::from_env();
    let port = config.server_port;

    if config.weather_api_key.is_empty() {
        tracing::warn!("WEATHER_API_KEY is not set; weather lookups will likely be rejected");
    }

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await
        .context("failed to initialize database")?;
    let weather = WeatherClient::new(&config).context("failed to build weather client")?;
    let state = Arc::new(AppState::new(db, config.clone(), Arc::new(weather)));

    if let Some(path) = &config.fuel_table_path {
        state
            .seed_fuel_table(path)
            .await
            .with_context(|| format!("failed to seed fuel table from {}", path))?;
    }
    match state.database().fuel_sample_count().await {
        Ok(0) => tracing::warn!("No fuel samples stored; every estimate will be not found"),
        Ok(count) => tracing::info!("{} fuel samples available", count),
        Err(e) => tracing::warn!("Failed to count fuel samples: {}", e),
    }

    // Build the app
    let app = api::routes()
        .with_state(state.clone())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    tracing::info!("Vessel Server stopped");
    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
    state.begin_shutdown();
}
