//! Background soft-deletion of records.
//!
//! A single consumer drains an unbounded queue of [`DeleteRequest`]s in
//! arrival order. Producers hold a [`DeleteQueue`] and never wait for the
//! store; enqueueing only fails once the worker is gone.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::delete_request::DeleteRequest;
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;

/// Producer side of the delete worker queue.
#[derive(Debug, Clone)]
pub struct DeleteQueue {
    tx: mpsc::UnboundedSender<DeleteRequest>,
}

impl DeleteQueue {
    pub fn new(tx: mpsc::UnboundedSender<DeleteRequest>) -> Self {
        Self { tx }
    }

    /// Enqueues a deletion and returns without waiting for it to land.
    ///
    /// An empty id list is accepted and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the worker has stopped.
    pub fn submit(&self, ids: Vec<String>, owner_id: impl Into<String>) -> Result<(), AppError> {
        let request = DeleteRequest::new(ids, owner_id);
        if request.is_empty() {
            return Ok(());
        }

        self.tx.send(request).map_err(|e| {
            tracing::error!(owner_id = %e.0.owner_id, "Delete worker is not running");
            AppError::internal("Delete queue is closed", json!({}))
        })
    }

    /// Returns whether the worker side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Drains `rx` until every [`DeleteQueue`] handle is dropped.
///
/// Each request is applied with [`RecordRepository::soft_delete`]. Failures
/// are logged and the loop moves on to the next request; nothing is retried.
pub async fn run_delete_worker<R>(mut rx: mpsc::UnboundedReceiver<DeleteRequest>, repository: Arc<R>)
where
    R: RecordRepository + ?Sized,
{
    tracing::info!("Delete worker started");

    while let Some(request) = rx.recv().await {
        match repository
            .soft_delete(&request.ids, &request.owner_id)
            .await
        {
            Ok(marked) => {
                tracing::debug!(
                    owner_id = %request.owner_id,
                    requested = request.ids.len(),
                    marked,
                    "Delete request applied"
                );
            }
            Err(e) => {
                tracing::warn!(
                    owner_id = %request.owner_id,
                    ids = ?request.ids,
                    error = %e,
                    "Delete request failed"
                );
            }
        }
    }

    tracing::info!("Delete worker stopped");
}

/// Spawns the delete worker on the current runtime.
///
/// The worker exits after the last [`DeleteQueue`] clone is dropped and the
/// queue is drained; awaiting the handle waits for that.
pub fn spawn_delete_worker<R>(repository: Arc<R>) -> (DeleteQueue, JoinHandle<()>)
where
    R: RecordRepository + ?Sized + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_delete_worker(rx, repository));

    (DeleteQueue::new(tx), handle)
}
