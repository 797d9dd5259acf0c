//! Cache Module
//!
//! Provides single-value in-memory caching with TTL freshness.

mod entry;
mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use ttl::TtlCache;
