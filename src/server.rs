//! HTTP server initialization and runtime setup.
//!
//! Handles record store selection, delete worker spawning, and Axum server
//! lifecycle.

use crate::config::Config;
use crate::domain::delete_worker::spawn_delete_worker;
use crate::infrastructure::persistence::connect_repository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record store (PostgreSQL with migrations, file, or memory)
/// - Background delete worker
/// - Axum HTTP server
///
/// On shutdown the delete queue is drained before returning.
///
/// # Errors
///
/// Returns an error if:
/// - The record store cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = connect_repository(&config)
        .await
        .context("Failed to open record store")?;

    let (delete_queue, delete_worker) = spawn_delete_worker(repository.clone());
    tracing::info!("Delete worker spawned");

    let state = AppState::new(repository, delete_queue, &config);
    let app = app_router(state);

    let listener = TcpListener::bind(&config.server_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address))?;
    tracing::info!("Listening on http://{}", config.server_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and every queue handle it held) is dropped by now.
    if let Err(e) = delete_worker.await {
        tracing::error!(error = %e, "Delete worker terminated abnormally");
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
