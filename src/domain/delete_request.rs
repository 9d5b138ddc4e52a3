//! Deletion request model for the background delete worker.

/// A batch of short ids an owner asked to delete.
///
/// Handed from HTTP handlers to [`crate::domain::delete_worker`] through an
/// unbounded channel, so the response does not wait for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub ids: Vec<String>,
    pub owner_id: String,
}

impl DeleteRequest {
    /// Creates a new deletion request.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let request = DeleteRequest::new(vec!["abc123".to_string()], "u1");
    /// assert_eq!(request.owner_id, "u1");
    /// ```
    pub fn new(ids: Vec<String>, owner_id: impl Into<String>) -> Self {
        Self {
            ids,
            owner_id: owner_id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
