//! DTOs for the batch shortening endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::domain::entities::BatchEntry;
use crate::utils::id_generator::is_reserved_id;

/// Characters a correlation id may use; it is served back as a path segment.
static CORRELATION_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

fn not_reserved(id: &str) -> Result<(), ValidationError> {
    if is_reserved_id(id) {
        return Err(ValidationError::new("reserved").with_message("This id is reserved".into()));
    }
    Ok(())
}

/// One URL of a batch request.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchRequestItem {
    /// Caller-chosen id; also becomes the short id.
    #[validate(length(min = 1, max = 64))]
    #[validate(regex(path = "*CORRELATION_ID_REGEX"))]
    #[validate(custom(function = "not_reserved"))]
    pub correlation_id: String,

    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,
}

impl From<BatchRequestItem> for BatchEntry {
    fn from(item: BatchRequestItem) -> Self {
        BatchEntry::new(item.correlation_id, item.original_url)
    }
}

/// One entry of the batch response, in request order.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponseItem {
    pub correlation_id: String,
    pub short_url: String,
}
