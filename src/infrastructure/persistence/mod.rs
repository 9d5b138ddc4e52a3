//! Record store backends.
//!
//! Both implement [`RecordRepository`] with identical observable behavior.
//!
//! # Repositories
//!
//! - [`FileRecordRepository`] - In-process list, optionally mirrored to a JSON file
//! - [`PgRecordRepository`] - PostgreSQL tables `urls` and `user_urls`

pub mod file_record_repository;
pub mod pg_record_repository;

pub use file_record_repository::FileRecordRepository;
pub use pg_record_repository::PgRecordRepository;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::domain::repositories::RecordRepository;
use crate::error::StoreError;

/// Builds the record store selected by the configuration.
///
/// `DATABASE_DSN` selects PostgreSQL; otherwise the file backend is used,
/// backed by `FILE_STORAGE_PATH` or by memory alone when that is unset.
/// The choice is made once here and never revisited.
///
/// # Errors
///
/// Returns [`StoreError`] if the database is unreachable, migrations fail,
/// or the storage file cannot be read.
pub async fn connect_repository(config: &Config) -> Result<Arc<dyn RecordRepository>, StoreError> {
    if let Some(dsn) = &config.database_dsn {
        let repository = PgRecordRepository::connect(
            dsn,
            config.db_max_connections,
            Duration::from_secs(config.db_connect_timeout),
        )
        .await?;
        tracing::info!("Record store: PostgreSQL");
        return Ok(Arc::new(repository));
    }

    match &config.file_storage_path {
        Some(path) => {
            let repository = FileRecordRepository::open(path.as_str()).await?;
            tracing::info!(path = %path, "Record store: file");
            Ok(Arc::new(repository))
        }
        None => {
            tracing::info!("Record store: memory only");
            Ok(Arc::new(FileRecordRepository::in_memory()))
        }
    }
}
