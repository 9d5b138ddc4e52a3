//! Store statistics service.

use std::sync::Arc;

use crate::domain::entities::StoreStats;
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;

/// Service for reading aggregate counts from the record store.
pub struct StatsService<R: RecordRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: RecordRepository + ?Sized> StatsService<R> {
    /// Creates a new statistics service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns the number of stored short ids and distinct owners.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn get_stats(&self) -> Result<StoreStats, AppError> {
        Ok(self.repository.stats().await?)
    }

    /// Returns whether the store answers a trivial query.
    pub async fn ping(&self) -> bool {
        match self.repository.stats().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Record store ping failed");
                false
            }
        }
    }
}
