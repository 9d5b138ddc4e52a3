//! DTOs for the per-owner URL endpoints.

use serde::{Deserialize, Serialize};

/// A record owned by the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserUrlItem {
    pub short_url: String,
    pub original_url: String,
}
