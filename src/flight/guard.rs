//! Registry guard
//!
//! RAII type that removes a dispatched operation's registry entry when the
//! operation finishes, panics, or is aborted. It is created once the
//! registry lock is released, so a panic while building the operation also
//! frees the key.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

/// Removes one registry entry on drop.
///
/// The `id` check keeps a late drop from removing a newer entry that reused
/// the same key after a cancel.
pub(crate) struct RegistryGuard<V> {
    registry: Arc<DashMap<String, V>>,
    key: String,
    id: u64,
    id_of: fn(&V) -> u64,
}

impl<V> RegistryGuard<V> {
    pub(crate) fn new(
        registry: Arc<DashMap<String, V>>,
        key: String,
        id: u64,
        id_of: fn(&V) -> u64,
    ) -> Self {
        Self {
            registry,
            key,
            id,
            id_of,
        }
    }
}

impl<V> Drop for RegistryGuard<V> {
    fn drop(&mut self) {
        let id_of = self.id_of;
        let id = self.id;
        if self
            .registry
            .remove_if(&self.key, |_, pending| id_of(pending) == id)
            .is_some()
        {
            debug!("Single-flight: released '{}'", self.key);
        }
    }
}
