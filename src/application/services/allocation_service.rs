//! Short id allocation and lookup service.

use std::sync::Arc;

use crate::config::DEFAULT_MAX_ALLOCATION_ATTEMPTS;
use crate::domain::entities::{Allocation, Lookup, NewRecord, PutOutcome, Record};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use crate::utils::id_generator::IdGenerator;
use serde_json::json;

/// Service that assigns short ids to URLs.
///
/// A collision (id already taken) is retried with a fresh id from the
/// generator, up to `max_attempts` tries in total. A duplicate (URL already
/// stored) ends the allocation immediately with the existing id. The two
/// outcomes never share a path.
pub struct AllocationService<R: RecordRepository + ?Sized, G: IdGenerator + ?Sized> {
    repository: Arc<R>,
    generator: Arc<G>,
    max_attempts: usize,
}

impl<R: RecordRepository + ?Sized, G: IdGenerator + ?Sized> AllocationService<R, G> {
    /// Creates a new allocation service with the default retry ceiling.
    pub fn new(repository: Arc<R>, generator: Arc<G>) -> Self {
        Self {
            repository,
            generator,
            max_attempts: DEFAULT_MAX_ALLOCATION_ATTEMPTS,
        }
    }

    /// Overrides the retry ceiling. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Allocates a short id for `url` owned by `owner_id`, starting from a
    /// generated candidate.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate_with_candidate`].
    pub async fn allocate(&self, url: &str, owner_id: &str) -> Result<Allocation, AppError> {
        let candidate = self.generator.generate();
        self.allocate_with_candidate(candidate, url, owner_id).await
    }

    /// Allocates a short id for `url`, trying `candidate` first.
    ///
    /// # Returns
    ///
    /// - [`Allocation::created`] with the id that was stored
    /// - [`Allocation::duplicate`] with the id already holding `url`; no new
    ///   id is consumed and nothing is written
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `url` is blank.
    /// Returns [`AppError::Internal`] if every attempt collides or the store
    /// fails. Store failures are not retried.
    pub async fn allocate_with_candidate(
        &self,
        candidate: String,
        url: &str,
        owner_id: &str,
    ) -> Result<Allocation, AppError> {
        if url.trim().is_empty() {
            return Err(AppError::bad_request("URL must not be empty", json!({})));
        }

        let mut candidate = candidate;

        for attempt in 1..=self.max_attempts {
            let record = NewRecord::new(candidate.clone(), url, owner_id);

            match self.repository.put(record).await? {
                PutOutcome::Created => {
                    tracing::debug!(id = %candidate, url, owner_id, attempt, "Short id allocated");
                    return Ok(Allocation::created(candidate));
                }
                PutOutcome::Duplicate { existing_id } => {
                    tracing::debug!(id = %existing_id, url, "URL already shortened");
                    return Ok(Allocation::duplicate(existing_id));
                }
                PutOutcome::Collision => {
                    tracing::debug!(id = %candidate, attempt, "Short id collision, regenerating");
                    if attempt < self.max_attempts {
                        candidate = self.generator.generate();
                    }
                }
            }
        }

        tracing::error!(
            candidate = %candidate,
            url,
            attempts = self.max_attempts,
            "Short id allocation exhausted"
        );

        Err(AppError::internal(
            "Failed to allocate short id",
            json!({ "reason": "Too many collisions", "attempts": self.max_attempts }),
        ))
    }

    /// Resolves a short id to its URL, or to gone / not found.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn resolve(&self, id: &str) -> Result<Lookup, AppError> {
        Ok(self.repository.get(id).await?)
    }

    /// Lists every record owned by `owner_id`, tombstoned ones included.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Record>, AppError> {
        Ok(self.repository.list_by_owner(owner_id).await?)
    }
}
