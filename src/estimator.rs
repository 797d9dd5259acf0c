//! Block-Height Estimator
//!
//! Extrapolates the current block height from the last fetched height and
//! the Ark round interval, without a network round trip.
//!
//! The result is an approximation that can drift by a few rounds. It must
//! not be used for consensus-critical decisions.

use std::time::Duration;

use tokio::time::Instant;

use crate::cache::TtlCache;
use crate::models::ArkInfo;

// == Block Height Estimator ==
/// Owns the block height cache and the Ark info cache.
#[derive(Debug, Clone)]
pub struct BlockHeightEstimator {
    height: TtlCache<u64>,
    ark_info: TtlCache<ArkInfo>,
}

impl BlockHeightEstimator {
    // == Constructor ==
    /// # Arguments
    /// * `height_ttl` - Freshness window of a fetched block height
    /// * `ark_info_ttl` - Freshness window of fetched protocol info
    pub fn new(height_ttl: Duration, ark_info_ttl: Duration) -> Self {
        Self {
            height: TtlCache::new(height_ttl),
            ark_info: TtlCache::new(ark_info_ttl),
        }
    }

    /// Stores a freshly fetched block height.
    pub fn record_height(&mut self, height: u64) {
        self.height.set_value(height);
    }

    /// Stores freshly fetched protocol info.
    pub fn record_ark_info(&mut self, info: ArkInfo) {
        self.ark_info.set_value(info);
    }

    /// Last fetched height, only while fresh.
    pub fn fresh_height(&self) -> Option<u64> {
        self.height.get()
    }

    /// Last fetched protocol info, only while fresh.
    pub fn fresh_ark_info(&self) -> Option<ArkInfo> {
        self.ark_info.get()
    }

    /// Last fetched protocol info, fresh or stale.
    pub fn last_ark_info(&self) -> Option<ArkInfo> {
        self.ark_info.entry().map(|entry| entry.value.clone())
    }

    /// Drops both cached values.
    pub fn clear(&mut self) {
        self.height.clear();
        self.ark_info.clear();
    }

    // == Estimate ==
    /// Estimated current height, or None if no height was ever fetched.
    pub fn estimate(&self) -> Option<u64> {
        self.estimate_at(Instant::now())
    }

    /// Estimate evaluated against an explicit `now`.
    ///
    /// A stale height is still used since the extrapolation compensates for
    /// its age. Without a usable round interval the raw height is returned.
    pub fn estimate_at(&self, now: Instant) -> Option<u64> {
        let entry = self.height.entry()?;
        let interval = self
            .ark_info
            .entry()
            .map(|info| info.value.round_interval_secs)
            .filter(|secs| *secs > 0);

        Some(match interval {
            Some(secs) => extrapolate(entry.value, entry.age_at(now), secs),
            None => entry.value,
        })
    }
}

/// `height + floor(elapsed / interval)`.
pub fn extrapolate(height: u64, elapsed: Duration, round_interval_secs: u64) -> u64 {
    if round_interval_secs == 0 {
        return height;
    }
    height.saturating_add(elapsed.as_secs() / round_interval_secs)
}
