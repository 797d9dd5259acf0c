//! Single-Flight Dispatcher
//!
//! Registry of in-flight operations keyed by string. One dispatcher is
//! monomorphic over its value type, so no runtime casts are needed.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{AbortHandle, Abortable, BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::error::{Result, WalletError};
use crate::flight::guard::RegistryGuard;

type SharedResult<T> = Shared<BoxFuture<'static, Result<T>>>;

// == Pending Operation ==
/// One in-flight execution and the handle used to cancel it.
struct PendingOperation<T: Clone> {
    id: u64,
    result: SharedResult<T>,
    abort: AbortHandle,
}

impl<T: Clone> PendingOperation<T> {
    fn id(&self) -> u64 {
        self.id
    }
}

// == Single Flight ==
/// Deduplicates concurrent operations per key.
///
/// Each new operation runs on its own tokio task, so it settles (and releases
/// its key) even if every caller stops waiting. Results are not cached: once
/// an operation settles, the next call with the same key runs it again.
pub struct SingleFlight<T: Clone> {
    registry: Arc<DashMap<String, PendingOperation<T>>>,
    next_id: AtomicU64,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            registry: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    // == Execute ==
    /// Runs `operation` under `key`, or joins the run already in flight.
    ///
    /// All callers joined on one run receive the same value or error. The
    /// registry entry is removed before any waiter is resolved. `operation`
    /// is invoked after the registry lock is released, so it may call back
    /// into this dispatcher.
    ///
    /// # Arguments
    /// * `key` - Deduplication key
    /// * `operation` - Invoked at most once, only when `key` is idle
    pub async fn execute<F, Fut>(&self, key: &str, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (result, start) = match self.registry.entry(key.to_string()) {
            Entry::Occupied(pending) => {
                debug!("Single-flight: joining in-flight '{}'", key);
                (pending.get().result.clone(), None)
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = oneshot::channel::<Result<T>>();
                let (abort, registration) = AbortHandle::new_pair();

                let result = async move {
                    rx.await.unwrap_or_else(|_| {
                        Err(WalletError::Internal(
                            "dispatched operation ended without a result".to_string(),
                        ))
                    })
                }
                .boxed()
                .shared();

                slot.insert(PendingOperation {
                    id,
                    result: result.clone(),
                    abort,
                });
                (result, Some((id, tx, registration)))
            }
        };

        // Shard lock released. Only the caller that inserted the entry starts it
        if let Some((id, tx, registration)) = start {
            let guard = RegistryGuard::new(
                Arc::clone(&self.registry),
                key.to_string(),
                id,
                PendingOperation::<T>::id,
            );
            let work = operation();

            tokio::spawn(async move {
                let outcome = match Abortable::new(work, registration).await {
                    Ok(outcome) => outcome,
                    Err(_aborted) => Err(WalletError::Cancelled),
                };
                drop(guard);
                let _ = tx.send(outcome);
            });
            debug!("Single-flight: started '{}'", key);
        }

        result.await
    }

    // == Cancel ==
    /// Cancels the in-flight operation for `key`, if any.
    ///
    /// Waiters resolve with [`WalletError::Cancelled`]. Returns true if an
    /// operation was cancelled.
    pub fn cancel(&self, key: &str) -> bool {
        match self.registry.remove(key) {
            Some((_, pending)) => {
                pending.abort.abort();
                info!("Single-flight: cancelled '{}'", key);
                true
            }
            None => false,
        }
    }

    // == Cancel All ==
    /// Cancels every in-flight operation. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let keys: Vec<String> = self
            .registry
            .iter()
            .map(|pending| pending.key().clone())
            .collect();

        keys.iter().filter(|key| self.cancel(key)).count()
    }

    // == Is Running ==
    /// Returns true while an operation for `key` is in flight.
    pub fn is_running(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    /// Number of operations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
