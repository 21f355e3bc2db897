//! event-hub server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints. The database
//! connection is opened lazily by the first request that needs it.

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use event_hub::api;
use event_hub::app_state::AppState;
use event_hub::config::{AppConfig, LogFormat};
use event_hub::persistence::{ConnectionManager, PgConnector};
use event_hub::service::BookingService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing DATABASE_URL is fatal; nothing below can work without it.
    let config = AppConfig::from_env().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting event-hub");

    // Build persistence layer
    let connector = PgConnector::new(
        config.database_url.clone(),
        config.database_max_connections,
        config.database_min_connections,
        config.connect_timeout(),
    );
    let connections = Arc::new(ConnectionManager::new(connector, config.connect_timeout()));

    // Build service layer
    let bookings = Arc::new(BookingService::new(connections, config.query_timeout()));

    // Build application state
    let app_state = AppState { bookings };

    // Build router
    let app = api::build_router()
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
