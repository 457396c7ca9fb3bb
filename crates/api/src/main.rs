use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

mod app;
mod config;
mod error;
mod extractors;
mod jobs;
mod middleware;
mod routes;
mod sessions;

use jobs::{JobScheduler, SessionCleanupJob};
use sessions::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::metrics::init_metrics();

    info!(
        "Starting Eventownik panel API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Backend client
    let client = backend::BackendClient::new(
        config.backend.base_url.clone(),
        config.backend.service_token.clone(),
        config.backend.timeout(),
    )?;
    info!(backend = %config.backend.base_url, "Backend client ready");

    // Table session store and its cleanup job
    let sessions = Arc::new(SessionStore::new(config.limits.default_page_size));
    let mut scheduler = JobScheduler::new();
    scheduler.register(SessionCleanupJob::new(
        Arc::clone(&sessions),
        config.sessions.idle_ttl(),
        config.sessions.cleanup_interval_mins,
    ));
    scheduler.start();

    // Build application
    let addr = config.socket_addr();
    let app = app::create_app(config, client, sessions);

    // Start server
    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(5)).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
