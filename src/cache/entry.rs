//! Cache Entry Module
//!
//! Defines a single typed cache slot value together with its fetch time.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A cached value and the instant it was fetched.
///
/// Freshness is never stored; it is derived from the clock on every check.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// When the value was fetched
    pub fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: T) -> Self {
        Self::at(value, Instant::now())
    }

    /// Creates a new entry stamped with an explicit fetch time.
    pub fn at(value: T, fetched_at: Instant) -> Self {
        Self { value, fetched_at }
    }

    // == Age ==
    /// Time elapsed since the value was fetched.
    pub fn age(&self) -> Duration {
        self.age_at(Instant::now())
    }

    /// Time elapsed between the fetch and `now`, saturating at zero.
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    // == Is Fresh ==
    /// Checks if the entry is still fresh for the given TTL.
    ///
    /// Boundary condition: an entry whose age equals the TTL is stale.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(ttl, Instant::now())
    }

    /// Freshness evaluated against an explicit `now`.
    pub fn is_fresh_at(&self, ttl: Duration, now: Instant) -> bool {
        self.age_at(now) < ttl
    }

    // == Time To Live ==
    /// Remaining freshness, or zero once the TTL has elapsed.
    pub fn ttl_remaining(&self, ttl: Duration) -> Duration {
        ttl.saturating_sub(self.age())
    }
}
