//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;

use crate::domain::entities::Lookup;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short id to its original URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// # Response Codes
///
/// - **307 Temporary Redirect**: `Location` holds the original URL
/// - **410 Gone**: the id existed and was deleted
/// - **404 Not Found**: the id was never assigned
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    match state.allocation_service.resolve(&id).await? {
        Lookup::Found(url) => Ok(Redirect::temporary(&url)),
        Lookup::Gone => Err(AppError::gone(
            "Short link has been deleted",
            json!({ "id": id }),
        )),
        Lookup::NotFound => Err(AppError::not_found(
            "Short link not found",
            json!({ "id": id }),
        )),
    }
}
