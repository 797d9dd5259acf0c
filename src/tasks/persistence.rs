//! Persistence Task
//!
//! Background worker that writes fetched values to the persistent store.
//! Services hand records over a bounded channel and never wait on the store;
//! a full queue or a failed write is logged and otherwise ignored.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::WalletError;
use crate::models::Resource;
use crate::store::{StoredRecord, WalletStore};

// == Persistence Handle ==
/// Sending side of the persistence queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    tx: mpsc::Sender<StoredRecord>,
}

impl PersistenceHandle {
    /// Queues `value` to be upserted under `resource`.
    ///
    /// Never blocks. Returns false if the record was dropped.
    pub fn submit<T: Serialize>(&self, resource: Resource, value: &T) -> bool {
        let record = match StoredRecord::from_value(resource, value) {
            Ok(record) => record,
            Err(err) => {
                warn!("Persistence: {}", err);
                return false;
            }
        };

        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Persistence: {}",
                    WalletError::persistence(resource, "queue full, write dropped")
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(
                    "Persistence: {}",
                    WalletError::persistence(resource, "worker stopped")
                );
                false
            }
        }
    }
}

/// Spawns the persistence worker.
///
/// # Arguments
/// * `store` - Destination of every submitted record
/// * `capacity` - How many records may wait before new ones are dropped
///
/// # Returns
/// The handle services submit through, and the worker's JoinHandle. The
/// worker exits once every handle is dropped and the queue is drained.
pub fn spawn_persistence_task(
    store: Arc<dyn WalletStore>,
    capacity: usize,
) -> (PersistenceHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<StoredRecord>(capacity.max(1));

    let handle = tokio::spawn(async move {
        info!("Starting persistence task with queue capacity {}", capacity);

        while let Some(record) = rx.recv().await {
            let id = record.id.clone();
            match store.upsert(record).await {
                Ok(()) => debug!("Persistence: stored '{}'", id),
                Err(err) => warn!("Persistence: {}", err),
            }
        }

        info!("Persistence task stopped");
    });

    (PersistenceHandle { tx }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArkBalance;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_submitted_records_are_stored() {
        let store = Arc::new(MemoryStore::new());
        let (persistence, worker) = spawn_persistence_task(store.clone(), 8);

        assert!(persistence.submit(Resource::ArkBalance, &ArkBalance::spendable(10)));
        drop(persistence);
        worker.await.unwrap();

        let record = store.fetch("arkBalance").await.unwrap().unwrap();
        assert_eq!(record.payload["spendable"], 10);
    }

    #[tokio::test]
    async fn test_failed_writes_are_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let (persistence, worker) = spawn_persistence_task(store.clone(), 8);

        assert!(persistence.submit(Resource::ArkBalance, &ArkBalance::spendable(10)));
        drop(persistence);

        // Worker survives the failure and exits cleanly
        worker.await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let persistence = PersistenceHandle { tx };

        assert!(persistence.submit(Resource::ArkBalance, &ArkBalance::spendable(1)));
        assert!(!persistence.submit(Resource::ArkBalance, &ArkBalance::spendable(2)));

        let queued = rx.recv().await.unwrap();
        assert_eq!(queued.payload["spendable"], 1);
    }

    #[tokio::test]
    async fn test_stopped_worker_drops_records() {
        let store = Arc::new(MemoryStore::new());
        let (persistence, worker) = spawn_persistence_task(store, 8);
        worker.abort();
        let _ = worker.await;

        assert!(!persistence.submit(Resource::ArkBalance, &ArkBalance::spendable(1)));
    }
}
