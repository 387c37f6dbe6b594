//! Write coordination
//!
//! All mutations flow through one unbounded FIFO queue consumed by a
//! single worker task, so every write across every caller applies to the
//! remote store in submission order and no two writes ever run
//! concurrently. Callers get a [`WriteTicket`] per request and choose to
//! await it or drop it; the worker resolves, logs, and counts every
//! outcome regardless. Shutdown closes the queue and joins the worker
//! only after the queue has fully drained.

mod errors;
mod guard;
mod request;

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::cache::StoreCache;
use crate::observability::{Logger, PipelineEvent, PipelineMetrics};
use crate::remote::RemoteStoreClient;

pub use errors::WriteError;
pub use guard::TestModeGuard;
pub use request::{WriteOperation, WriteOutcome, WriteRequest, WriteTicket};

struct QueuedWrite {
    request: WriteRequest,
    done: oneshot::Sender<Result<WriteOutcome, WriteError>>,
}

/// The single sequential write pipeline of one store instance
pub struct WriteCoordinator {
    sender: Mutex<Option<mpsc::UnboundedSender<QueuedWrite>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WriteCoordinator {
    /// Spawn the worker task and open the queue
    pub fn spawn(
        remote: Arc<dyn RemoteStoreClient>,
        cache: Arc<StoreCache>,
        guard: TestModeGuard,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(worker_loop(rx, remote, cache, guard, metrics));
        Self {
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a request, returning its completion ticket
    ///
    /// After shutdown the ticket resolves immediately with
    /// [`WriteError::Terminated`]; submission itself never blocks.
    pub fn submit(&self, request: WriteRequest) -> WriteTicket {
        let (done, rx) = oneshot::channel();
        let queued = QueuedWrite { request, done };

        let sent = match self.sender.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(tx) => tx.send(queued).is_ok(),
                None => false,
            },
            Err(_) => false,
        };

        if sent {
            WriteTicket::pending(rx)
        } else {
            WriteTicket::rejected(WriteError::Terminated)
        }
    }

    /// Close the queue and wait for the worker to drain it
    ///
    /// Returns only once every request accepted before this call has been
    /// applied (or suppressed) and the worker task has exited. Idempotent.
    pub async fn shutdown(&self) {
        let sender = match self.sender.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if sender.is_some() {
            Logger::emit(PipelineEvent::DrainStart, &[]);
        }
        drop(sender);

        let worker = match self.worker.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = worker {
            let _ = handle.await;
            Logger::emit(PipelineEvent::DrainComplete, &[]);
        }
    }
}

/// Dequeue and apply requests until the queue is closed and empty
async fn worker_loop(
    mut rx: mpsc::UnboundedReceiver<QueuedWrite>,
    remote: Arc<dyn RemoteStoreClient>,
    cache: Arc<StoreCache>,
    guard: TestModeGuard,
    metrics: Arc<PipelineMetrics>,
) {
    while let Some(QueuedWrite { request, done }) = rx.recv().await {
        if !guard.allows(&request.key.value) {
            metrics.increment_suppressed();
            Logger::emit(
                PipelineEvent::WriteSuppressed,
                &[
                    ("request_id", &request.id.to_string()),
                    ("table", &request.table),
                    ("operation", request.operation.name()),
                ],
            );
            let _ = done.send(Ok(WriteOutcome::Suppressed));
            continue;
        }

        let result = apply(remote.as_ref(), &request).await;
        match &result {
            Ok(()) => {
                metrics.increment_applied();
                Logger::emit(
                    PipelineEvent::WriteApplied,
                    &[
                        ("request_id", &request.id.to_string()),
                        ("table", &request.table),
                        ("operation", request.operation.name()),
                    ],
                );
            }
            Err(error) => {
                // A failed write must never take the worker down with it;
                // report it, invalidate the optimistic cache entry so the
                // next read refetches, and move on to the next request.
                metrics.increment_failed();
                Logger::emit(
                    PipelineEvent::WriteFailed,
                    &[
                        ("request_id", &request.id.to_string()),
                        ("table", &request.table),
                        ("operation", request.operation.name()),
                        ("error", &error.to_string()),
                    ],
                );
                cache.remove(&request.table, &request.key.value);
            }
        }

        let _ = done.send(result.map(|()| WriteOutcome::Applied));
    }
}

/// Apply one request against the remote store
async fn apply(remote: &dyn RemoteStoreClient, request: &WriteRequest) -> Result<(), WriteError> {
    let result = match request.operation {
        WriteOperation::Insert => remote
            .insert(&request.table, request.payload.clone())
            .await
            .map(|_row| ()),
        WriteOperation::Update => {
            remote
                .update(&request.table, request.key.clone(), request.payload.clone())
                .await
        }
        WriteOperation::Upsert => remote.upsert(&request.table, request.payload.clone()).await,
        WriteOperation::Delete => remote.delete(&request.table, request.key.clone()).await,
    };

    result.map_err(|source| WriteError::Remote {
        operation: request.operation.name(),
        table: request.table.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryRemote;
    use crate::schema::TableDescriptor;
    use serde_json::json;

    fn descriptor() -> TableDescriptor {
        TableDescriptor {
            table: "Motd".to_string(),
            primary_key: "user_id".to_string(),
            cache_reads: false,
        }
    }

    fn fields(value: serde_json::Value) -> crate::codec::FieldMap {
        match value {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn pipeline(
        remote: Arc<dyn RemoteStoreClient>,
        guard: TestModeGuard,
    ) -> (WriteCoordinator, Arc<StoreCache>) {
        let cache = Arc::new(StoreCache::new());
        let coordinator = WriteCoordinator::spawn(
            remote,
            Arc::clone(&cache),
            guard,
            Arc::new(PipelineMetrics::new()),
        );
        (coordinator, cache)
    }

    #[tokio::test]
    async fn test_submit_and_await_applies_write() {
        let remote = Arc::new(InMemoryRemote::new().with_table("Motd", "user_id"));
        let (coordinator, _cache) = pipeline(remote.clone(), TestModeGuard::disabled());

        let request = WriteRequest::new(
            &descriptor(),
            5,
            WriteOperation::Upsert,
            fields(json!({"user_id": 5, "motd": "hello"})),
        );
        let outcome = coordinator.submit(request).wait().await.unwrap();

        assert_eq!(outcome, WriteOutcome::Applied);
        assert_eq!(remote.row_count("Motd").await, 1);
        coordinator.shutdown().await;
    }

    #[tokio::test]
    async fn test_suppressed_write_resolves_successfully() {
        let remote = Arc::new(InMemoryRemote::new().with_table("Motd", "user_id"));
        let (coordinator, _cache) = pipeline(remote.clone(), TestModeGuard::sandbox(99));

        let request = WriteRequest::new(
            &descriptor(),
            5,
            WriteOperation::Upsert,
            fields(json!({"user_id": 5, "motd": "hello"})),
        );
        let outcome = coordinator.submit(request).wait().await.unwrap();

        assert_eq!(outcome, WriteOutcome::Suppressed);
        assert_eq!(remote.row_count("Motd").await, 0);
        coordinator.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let remote = Arc::new(InMemoryRemote::new().with_table("Motd", "user_id"));
        let (coordinator, _cache) = pipeline(remote.clone(), TestModeGuard::disabled());

        for user_id in 0..20 {
            let request = WriteRequest::new(
                &descriptor(),
                user_id,
                WriteOperation::Upsert,
                fields(json!({"user_id": user_id, "motd": "m"})),
            );
            coordinator.submit(request).detach();
        }
        coordinator.shutdown().await;

        assert_eq!(remote.row_count("Motd").await, 20);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_rejected() {
        let remote = Arc::new(InMemoryRemote::new().with_table("Motd", "user_id"));
        let (coordinator, _cache) = pipeline(remote, TestModeGuard::disabled());
        coordinator.shutdown().await;

        let request = WriteRequest::new(
            &descriptor(),
            5,
            WriteOperation::Delete,
            crate::codec::FieldMap::new(),
        );
        let result = coordinator.submit(request).wait().await;
        assert!(matches!(result, Err(WriteError::Terminated)));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let remote = Arc::new(InMemoryRemote::new());
        let (coordinator, _cache) = pipeline(remote, TestModeGuard::disabled());
        coordinator.shutdown().await;
        coordinator.shutdown().await;
    }
}
