//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /`        - Shorten a plain-text URL
//! - `GET  /{id}`    - Short link redirect
//! - `GET  /ping`    - Health check: store, delete queue
//! - `/api/*`        - JSON API

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler, shorten_text_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/ping", get(health_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .with_state(state)
        .layer(tracing::layer())
}
