//! DTOs for the internal statistics endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::entities::StoreStats;

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub urls: u64,
    pub users: u64,
}

impl From<StoreStats> for StatsResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            urls: stats.urls,
            users: stats.users,
        }
    }
}
