//! Application layer services implementing business logic.
//!
//! Services consume the record store trait and the id generator and give
//! HTTP handlers and the admin CLI a small API.
//!
//! # Available Services
//!
//! - [`services::allocation_service::AllocationService`] - Id allocation with collision retry and duplicate detection
//! - [`services::batch_service::BatchService`] - Atomic batch inserts
//! - [`services::stats_service::StatsService`] - Store statistics

pub mod services;
