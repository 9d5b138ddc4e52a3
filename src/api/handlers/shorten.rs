//! Handlers for single-URL shortening.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::domain::entities::Allocation;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_headers::extract_owner_from_headers;

/// Shortens a URL sent as a plain-text body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response Codes
///
/// - **201 Created**: new short URL in the body
/// - **409 Conflict**: the URL was already shortened; the existing short URL
///   is in the body
/// - **400 Bad Request**: body is not a valid URL
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, String), AppError> {
    let request = ShortenRequest {
        url: body.trim().to_string(),
    };
    request.validate()?;

    let owner_id = extract_owner_from_headers(&headers)?;
    let allocation = state
        .allocation_service
        .allocate(&request.url, &owner_id)
        .await?;

    Ok((status_for(&allocation), state.short_url(&allocation.id)))
}

/// Shortens a URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/aB3xYz" }
/// ```
///
/// Status is 201 for a new link and 409 when the URL was already shortened,
/// with the existing short URL as `result`.
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let owner_id = extract_owner_from_headers(&headers)?;
    let allocation = state
        .allocation_service
        .allocate(&payload.url, &owner_id)
        .await?;

    let response = ShortenResponse {
        result: state.short_url(&allocation.id),
    };

    Ok((status_for(&allocation), Json(response)))
}

fn status_for(allocation: &Allocation) -> StatusCode {
    if allocation.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}
