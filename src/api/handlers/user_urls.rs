//! Handlers for the caller's own records.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::dto::user_urls::UserUrlItem;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_headers::require_owner_from_headers;

/// Lists the records created by the caller.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response Codes
///
/// - **200 OK**: `[{"short_url", "original_url"}]`
/// - **204 No Content**: the caller owns nothing
/// - **401 Unauthorized**: no `X-User-ID` header
pub async fn user_urls_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let owner_id = require_owner_from_headers(&headers)?;
    let records = state.allocation_service.list_by_owner(&owner_id).await?;

    if records.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let items: Vec<UserUrlItem> = records
        .into_iter()
        .map(|r| UserUrlItem {
            short_url: state.short_url(&r.id),
            original_url: r.url,
        })
        .collect();

    Ok(Json(items).into_response())
}

/// Queues the listed short ids for deletion.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// Body is a JSON array of short ids. The response is sent before the
/// records are marked; ids the caller does not own are ignored.
///
/// # Response Codes
///
/// - **202 Accepted**
/// - **401 Unauthorized**: no `X-User-ID` header
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(ids): Json<Vec<String>>,
) -> Result<StatusCode, AppError> {
    let owner_id = require_owner_from_headers(&headers)?;

    state.delete_queue.submit(ids, owner_id)?;

    Ok(StatusCode::ACCEPTED)
}
