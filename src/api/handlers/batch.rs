//! Handler for batch shortening.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::batch::{BatchRequestItem, BatchResponseItem};
use crate::domain::entities::BatchEntry;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_headers::extract_owner_from_headers;

/// Stores a list of URLs as one unit.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "c1", "original_url": "https://a.example" },
///   { "correlation_id": "c2", "original_url": "https://b.example" }
/// ]
/// ```
///
/// # Response
///
/// ```json
/// [
///   { "correlation_id": "c1", "short_url": "http://localhost:8080/c1" },
///   { "correlation_id": "c2", "short_url": "http://localhost:8080/c2" }
/// ]
/// ```
///
/// # Errors
///
/// - **400**: empty batch or an invalid entry
/// - **409**: an id or URL is already stored; nothing was written
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(items): Json<Vec<BatchRequestItem>>,
) -> Result<(StatusCode, Json<Vec<BatchResponseItem>>), AppError> {
    for (index, item) in items.iter().enumerate() {
        item.validate().map_err(|e| {
            AppError::bad_request(
                "Invalid batch entry",
                json!({ "index": index, "errors": e.field_errors() }),
            )
        })?;
    }

    let owner_id = extract_owner_from_headers(&headers)?;
    let entries: Vec<BatchEntry> = items.into_iter().map(BatchEntry::from).collect();

    let allocations = state
        .batch_service
        .allocate_batch(entries, &owner_id)
        .await?;

    let response = allocations
        .into_iter()
        .map(|a| BatchResponseItem {
            short_url: state.short_url(&a.id),
            correlation_id: a.correlation_id,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(response)))
}
