//! Momentum escrow auditor: entry point.
//!
//! Starts a background watcher that polls Soroban `getEvents` RPC for escrow
//! contract events and persists them to SQLite, and serves a small Axum REST
//! API that exposes each campaign's event history and its replayed audit.

mod api;
mod audit;
mod config;
mod db;
mod errors;
mod events;
mod rpc;
mod watcher;

use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use watcher::WatcherState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load optional .env file (ignored if missing) before anything reads the
    // environment, RUST_LOG included.
    let _ = dotenvy::dotenv();

    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let shutdown = CancellationToken::new();

    // ─── Background watcher ───────────────────────────────
    let watcher_state = Arc::new(WatcherState {
        pool: pool.clone(),
        config: config.clone(),
        client,
    });
    let watcher = tokio::spawn(watcher::run(watcher_state, shutdown.clone()));

    // ─── REST API ─────────────────────────────────────────
    let app = api::router(Arc::new(api::ApiState { pool }));

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutdown requested");
            signal.cancel();
        })
        .await?;

    // The server can also stop on its own; make sure the watcher follows.
    shutdown.cancel();
    watcher.await?;

    info!("Auditor stopped");
    Ok(())
}
