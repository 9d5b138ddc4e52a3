//! Record entity: one short id mapped to one URL, owned by one user.

use serde::{Deserialize, Serialize};

/// A stored short-id → URL mapping.
///
/// The serialized field names match the on-disk format of the file backend
/// (`ID`, `URL`, `UserID`). Files written before soft deletion existed have
/// no `DeletedFlag` field; such records load as active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "UserID", default)]
    pub owner_id: String,
    #[serde(rename = "DeletedFlag", default)]
    pub deleted: bool,
}

impl Record {
    /// Creates an active record.
    pub fn new(id: String, url: String, owner_id: String) -> Self {
        Self {
            id,
            url,
            owner_id,
            deleted: false,
        }
    }

    /// Returns true if the record has been tombstoned.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Input data for inserting a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub id: String,
    pub url: String,
    pub owner_id: String,
}

impl NewRecord {
    pub fn new(id: impl Into<String>, url: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            owner_id: owner_id.into(),
        }
    }

    pub fn into_record(self) -> Record {
        Record::new(self.id, self.url, self.owner_id)
    }
}

/// Result of a single-record insert attempt.
///
/// Collision and duplicate are distinct outcomes: a collision means the id
/// is taken and the caller should retry with another id, a duplicate means
/// the URL is already stored and `existing_id` is its canonical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    Duplicate { existing_id: String },
    Collision,
}

/// Lookup status of a short id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Found,
    NotFound,
    Gone,
}

/// Result of resolving a short id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The id maps to an active record.
    Found(String),
    /// The id existed but has been soft-deleted.
    Gone,
    /// The id was never assigned.
    NotFound,
}

impl Lookup {
    pub fn status(&self) -> LookupStatus {
        match self {
            Lookup::Found(_) => LookupStatus::Found,
            Lookup::Gone => LookupStatus::Gone,
            Lookup::NotFound => LookupStatus::NotFound,
        }
    }

    /// Returns the URL if the id resolved to an active record.
    pub fn url(&self) -> Option<&str> {
        match self {
            Lookup::Found(url) => Some(url),
            _ => None,
        }
    }
}

/// Aggregate counters over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of short ids ever assigned, tombstones included.
    pub urls: u64,
    /// Number of distinct owners.
    pub users: u64,
}
