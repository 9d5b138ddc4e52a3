//! Repository trait definitions for the domain layer.
//!
//! The trait abstracts record storage so services never know which backend
//! is active. Implementations live in `crate::infrastructure::persistence`;
//! a mock is generated via `mockall` for unit tests.

pub mod record_repository;

pub use record_repository::RecordRepository;

#[cfg(test)]
pub use record_repository::MockRecordRepository;
