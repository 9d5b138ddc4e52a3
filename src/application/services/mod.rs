//! Business logic services for the application layer.

pub mod allocation_service;
pub mod batch_service;
pub mod stats_service;

pub use allocation_service::AllocationService;
pub use batch_service::BatchService;
pub use stats_service::StatsService;
