//! Core domain entities.
//!
//! Entities are plain data structures without behaviour beyond small
//! accessors.
//!
//! # Entity Types
//!
//! - [`Record`] - A short id mapped to a URL and its owner
//! - [`Allocation`] - The id handed back for a shortened URL
//! - [`BatchEntry`] / [`BatchAllocation`] - Input and output of batch inserts
//!
//! Insert payloads use a separate struct ([`NewRecord`]) from the stored
//! [`Record`].

pub mod allocation;
pub mod record;

pub use allocation::{Allocation, AllocationOutcome, BatchAllocation, BatchEntry};
pub use record::{Lookup, LookupStatus, NewRecord, PutOutcome, Record, StoreStats};
