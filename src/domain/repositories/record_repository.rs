//! Repository trait for short-id records.

use crate::domain::entities::{Lookup, NewRecord, PutOutcome, Record, StoreStats};
use crate::error::StoreError;
use async_trait::async_trait;

/// Storage contract shared by every record backend.
///
/// Both backends must behave identically from the caller's point of view.
/// Which one is active is decided once at startup.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::FileRecordRepository`] - in-process list mirrored to a JSON file
/// - [`crate::infrastructure::persistence::PgRecordRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/store_properties.rs`, `tests/repository_pg.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Inserts a record unless its id or URL is already taken.
    ///
    /// # Returns
    ///
    /// - [`PutOutcome::Created`] if the record was stored
    /// - [`PutOutcome::Duplicate`] if a record with the same URL exists, with
    ///   that record's id; nothing is written
    /// - [`PutOutcome::Collision`] if the id is already assigned to any record,
    ///   tombstoned ones included; nothing is written
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only for backend failures.
    async fn put(&self, record: NewRecord) -> Result<PutOutcome, StoreError>;

    /// Resolves a short id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failures.
    async fn get(&self, id: &str) -> Result<Lookup, StoreError>;

    /// Returns every record owned by `owner_id`, tombstoned ones included,
    /// in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failures.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Record>, StoreError>;

    /// Marks the listed ids as deleted where they belong to `owner_id`.
    ///
    /// Ids that are unknown or owned by someone else are skipped silently.
    /// Already-deleted ids stay deleted. Returns the number of records that
    /// changed state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failures.
    async fn soft_delete(&self, ids: &[String], owner_id: &str) -> Result<u64, StoreError>;

    /// Inserts every record or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if any id or URL is already taken
    /// (or repeated within the batch). Nothing from the batch is persisted
    /// on any error.
    async fn insert_batch(&self, records: Vec<NewRecord>) -> Result<(), StoreError>;

    /// Counts stored ids and distinct owners.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failures.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}
