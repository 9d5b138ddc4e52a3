//! Allocation results returned by the allocation and batch services.

/// Whether an allocation stored a new record or found an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// A new record was stored under the returned id.
    Created,
    /// The URL was already stored; the returned id is the existing one.
    Duplicate,
}

/// Short id assigned to a URL together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub id: String,
    pub outcome: AllocationOutcome,
}

impl Allocation {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: AllocationOutcome::Created,
        }
    }

    pub fn duplicate(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: AllocationOutcome::Duplicate,
        }
    }

    pub fn is_created(&self) -> bool {
        self.outcome == AllocationOutcome::Created
    }
}

/// One entry of a batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub correlation_id: String,
    pub url: String,
}

impl BatchEntry {
    pub fn new(correlation_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            url: url.into(),
        }
    }
}

/// One entry of a committed batch: the caller's correlation id and the
/// short id it was stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAllocation {
    pub correlation_id: String,
    pub id: String,
}
