//! Caller identity extraction from HTTP request headers.

use crate::AppError;
use axum::http::HeaderMap;
use serde_json::json;
use std::net::IpAddr;

/// Header carrying the owner id issued by the session layer.
pub const OWNER_HEADER: &str = "x-user-id";

/// Header carrying the client address set by the reverse proxy.
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// Extracts the owner id from the `X-User-ID` header.
///
/// A missing header means an anonymous caller and yields an empty owner id.
/// Surrounding whitespace is trimmed.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the header value is not valid UTF-8.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-user-id", "u1".parse().unwrap());
///
/// assert_eq!(extract_owner_from_headers(&headers).unwrap(), "u1");
/// ```
pub fn extract_owner_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    let Some(value) = headers.get(OWNER_HEADER) else {
        return Ok(String::new());
    };

    let owner = value
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid X-User-ID header", json!({})))?;

    Ok(owner.trim().to_string())
}

/// Like [`extract_owner_from_headers`], but rejects anonymous callers.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] if the header is missing or blank.
pub fn require_owner_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    let owner = extract_owner_from_headers(headers)?;
    if owner.is_empty() {
        return Err(AppError::unauthorized(
            "X-User-ID header is required",
            json!({}),
        ));
    }
    Ok(owner)
}

/// Extracts the client address from the `X-Real-IP` header.
///
/// Returns `None` when the header is missing or does not parse as an IP.
pub fn extract_client_ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(REAL_IP_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
