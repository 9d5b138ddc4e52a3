//! Shared application state injected into every handler.

use ipnetwork::IpNetwork;
use std::sync::Arc;

use crate::application::services::{AllocationService, BatchService, StatsService};
use crate::config::Config;
use crate::domain::delete_worker::DeleteQueue;
use crate::domain::repositories::RecordRepository;
use crate::utils::id_generator::{IdGenerator, RandomIdGenerator};

/// Store backend selected at startup.
pub type SharedRepository = Arc<dyn RecordRepository>;

#[derive(Clone)]
pub struct AppState {
    pub allocation_service: Arc<AllocationService<dyn RecordRepository, dyn IdGenerator>>,
    pub batch_service: Arc<BatchService<dyn RecordRepository>>,
    pub stats_service: Arc<StatsService<dyn RecordRepository>>,
    pub delete_queue: DeleteQueue,
    pub base_url: String,
    pub trusted_subnet: Option<IpNetwork>,
}

impl AppState {
    /// Wires the services around `repository` using the settings in `config`.
    pub fn new(repository: SharedRepository, delete_queue: DeleteQueue, config: &Config) -> Self {
        let generator: Arc<dyn IdGenerator> =
            Arc::new(RandomIdGenerator::new(config.short_id_length));

        Self::with_generator(repository, generator, delete_queue, config)
    }

    /// Same as [`Self::new`] with a caller-supplied id generator.
    pub fn with_generator(
        repository: SharedRepository,
        generator: Arc<dyn IdGenerator>,
        delete_queue: DeleteQueue,
        config: &Config,
    ) -> Self {
        let allocation_service = AllocationService::new(repository.clone(), generator)
            .with_max_attempts(config.max_allocation_attempts);

        Self {
            allocation_service: Arc::new(allocation_service),
            batch_service: Arc::new(BatchService::new(repository.clone())),
            stats_service: Arc::new(StatsService::new(repository)),
            delete_queue,
            base_url: config.base_url.clone(),
            trusted_subnet: config.trusted_subnet,
        }
    }

    /// Public URL of a short id.
    pub fn short_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), id)
    }
}
