//! Handler for internal store statistics.

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::json;

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_headers::extract_client_ip_from_headers;

/// Returns the number of stored URLs and distinct owners.
///
/// # Endpoint
///
/// `GET /api/internal/stats`
///
/// # Access
///
/// The client address is taken from `X-Real-IP` and must fall inside
/// `TRUSTED_SUBNET`. With no subnet configured every caller gets 403.
///
/// # Response
///
/// ```json
/// { "urls": 42, "users": 7 }
/// ```
pub async fn internal_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    let Some(subnet) = state.trusted_subnet else {
        return Err(AppError::forbidden(
            "Internal statistics are disabled",
            json!({}),
        ));
    };

    let client_ip = extract_client_ip_from_headers(&headers)
        .ok_or_else(|| AppError::forbidden("Client address is unknown", json!({})))?;

    if !subnet.contains(client_ip) {
        tracing::debug!(%client_ip, %subnet, "Stats request from untrusted address");
        return Err(AppError::forbidden(
            "Client address is not trusted",
            json!({ "ip": client_ip.to_string() }),
        ));
    }

    let stats = state.stats_service.get_stats().await?;

    Ok(Json(stats.into()))
}
