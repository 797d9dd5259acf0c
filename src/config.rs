//! Configuration Module
//!
//! Handles loading and managing wallet core configuration from environment variables.

use std::env;
use std::time::Duration;

/// Wallet core configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds for the cached block height
    pub block_height_ttl: u64,
    /// TTL in seconds for the cached Ark protocol info
    pub ark_info_ttl: u64,
    /// Capacity of the persistence worker queue
    pub persistence_queue_size: usize,
    /// Auto-refresh interval in seconds
    pub refresh_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BLOCK_HEIGHT_TTL` - Block height cache TTL in seconds (default: 60)
    /// - `ARK_INFO_TTL` - Ark info cache TTL in seconds (default: 300)
    /// - `PERSISTENCE_QUEUE_SIZE` - Pending persistence writes (default: 64)
    /// - `REFRESH_INTERVAL` - Auto-refresh frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            block_height_ttl: parse_var::<u64>("BLOCK_HEIGHT_TTL")
                .unwrap_or(defaults.block_height_ttl),
            ark_info_ttl: parse_var::<u64>("ARK_INFO_TTL").unwrap_or(defaults.ark_info_ttl),
            persistence_queue_size: parse_var::<usize>("PERSISTENCE_QUEUE_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.persistence_queue_size),
            refresh_interval: parse_var::<u64>("REFRESH_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.refresh_interval),
        }
    }

    /// Block height TTL as a Duration.
    pub fn block_height_ttl(&self) -> Duration {
        Duration::from_secs(self.block_height_ttl)
    }

    /// Ark info TTL as a Duration.
    pub fn ark_info_ttl(&self) -> Duration {
        Duration::from_secs(self.ark_info_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_height_ttl: 60,
            ark_info_ttl: 300,
            persistence_queue_size: 64,
            refresh_interval: 30,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
