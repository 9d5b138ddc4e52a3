//! All-or-nothing batch shortening.

use std::sync::Arc;

use crate::domain::entities::{BatchAllocation, BatchEntry, NewRecord};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use crate::utils::id_generator::is_routable_id;
use serde_json::json;

/// Service that stores a caller-supplied list of URLs as one unit.
///
/// Correlation ids are used directly as short ids; there is no collision
/// retry. Either every entry is stored or none is.
pub struct BatchService<R: RecordRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: RecordRepository + ?Sized> BatchService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Stores every entry under its correlation id for `owner_id`.
    ///
    /// The result preserves input order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `entries` is empty (checked before
    /// the store is touched), an entry has a blank id or URL, or an id is not
    /// routable (see [`is_routable_id`]).
    /// Returns [`AppError::Conflict`] if any id or URL is already stored or
    /// repeated within the batch. Nothing from the batch is persisted then.
    /// Returns [`AppError::Internal`] on other store failures.
    pub async fn allocate_batch(
        &self,
        entries: Vec<BatchEntry>,
        owner_id: &str,
    ) -> Result<Vec<BatchAllocation>, AppError> {
        if entries.is_empty() {
            return Err(AppError::bad_request("Batch must not be empty", json!({})));
        }

        if let Some((index, _)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.correlation_id.trim().is_empty() || e.url.trim().is_empty())
        {
            return Err(AppError::bad_request(
                "Batch entry requires correlation_id and original_url",
                json!({ "index": index }),
            ));
        }

        if let Some((index, entry)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| !is_routable_id(&e.correlation_id))
        {
            return Err(AppError::bad_request(
                "correlation_id cannot be used as a short id",
                json!({ "index": index, "correlation_id": entry.correlation_id }),
            ));
        }

        let records: Vec<NewRecord> = entries
            .iter()
            .map(|e| NewRecord::new(e.correlation_id.as_str(), e.url.as_str(), owner_id))
            .collect();

        self.repository.insert_batch(records).await?;

        tracing::debug!(owner_id, count = entries.len(), "Batch stored");

        Ok(entries
            .into_iter()
            .map(|e| BatchAllocation {
                id: e.correlation_id.clone(),
                correlation_id: e.correlation_id,
            })
            .collect())
    }
}
