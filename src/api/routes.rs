//! API route configuration.

use crate::api::handlers::{
    delete_user_urls_handler, internal_stats_handler, shorten_batch_handler, shorten_handler,
    user_urls_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`         - Shorten one URL (JSON)
/// - `POST   /shorten/batch`   - Shorten a list of URLs atomically
/// - `GET    /user/urls`       - List the caller's records
/// - `DELETE /user/urls`       - Queue the caller's records for deletion
/// - `GET    /internal/stats`  - Store statistics (trusted subnet only)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route(
            "/user/urls",
            get(user_urls_handler).delete(delete_user_urls_handler),
        )
        .route("/internal/stats", get(internal_stats_handler))
}
