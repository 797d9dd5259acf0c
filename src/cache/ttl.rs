//! TTL Cache Module
//!
//! A single-slot typed cache whose value goes stale after a fixed TTL.

use std::time::Duration;

use tracing::debug;

use crate::cache::CacheEntry;

// == TTL Cache ==
/// Holds at most one value of type `T` plus its fetch time.
///
/// Performs no internal locking; callers confine it to one owner
/// (typically behind the owner's `RwLock`).
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    /// Current slot, fresh or stale
    entry: Option<CacheEntry<T>>,
    /// Freshness window
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    // == Constructor ==
    /// Creates an empty cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    // == Get ==
    /// Returns the cached value if present and fresh.
    ///
    /// A stale entry is left in place; staleness is re-evaluated on every call.
    pub fn get(&self) -> Option<T> {
        self.entry
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.value.clone())
    }

    // == Is Valid ==
    /// Same freshness predicate as [`TtlCache::get`] without cloning the value.
    pub fn is_valid(&self) -> bool {
        self.entry
            .as_ref()
            .map(|entry| entry.is_fresh(self.ttl))
            .unwrap_or(false)
    }

    // == Set ==
    /// Replaces the entry and resets its fetch time to now.
    pub fn set_value(&mut self, value: T) {
        self.entry = Some(CacheEntry::new(value));
    }

    // == Clear ==
    /// Removes the entry entirely.
    pub fn clear(&mut self) {
        self.entry = None;
    }

    // == Get Or Compute ==
    /// Returns the fresh value, or stores and returns the provider's result.
    pub fn get_or_compute<F>(&mut self, provider: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get() {
            debug!("TTL cache hit");
            return value;
        }
        let value = provider();
        self.set_value(value.clone());
        value
    }

    /// Fallible variant of [`TtlCache::get_or_compute`].
    ///
    /// On provider failure the cache is left untouched and the error returned.
    pub fn get_or_try_compute<F, E>(&mut self, provider: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            debug!("TTL cache hit");
            return Ok(value);
        }
        let value = provider()?;
        self.set_value(value.clone());
        Ok(value)
    }

    // == Entry ==
    /// Returns the raw entry regardless of freshness.
    pub fn entry(&self) -> Option<&CacheEntry<T>> {
        self.entry.as_ref()
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
