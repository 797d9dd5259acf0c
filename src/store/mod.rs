//! Persistent Store Module
//!
//! The keyed record store results are written to so they survive restarts.
//! The core only ever upserts; it never reads the store to make refresh
//! decisions.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::models::Resource;

pub use memory::MemoryStore;

// == Stored Record ==
/// One persisted value, keyed by a stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Stable identifier (the resource key)
    pub id: String,
    pub resource: Resource,
    /// The fetched value as JSON
    pub payload: serde_json::Value,
    pub stored_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Serializes `value` into a record for `resource`.
    pub fn from_value<T: Serialize>(resource: Resource, value: &T) -> Result<Self> {
        let payload =
            serde_json::to_value(value).map_err(|e| WalletError::persistence(resource, e))?;
        Ok(Self {
            id: resource.key().to_string(),
            resource,
            payload,
            stored_at: Utc::now(),
        })
    }
}

// == Wallet Store ==
/// Keyed record store supporting upsert, fetch and delete.
#[async_trait]
pub trait WalletStore: Send + Sync + 'static {
    /// Inserts or replaces the record with the same id.
    async fn upsert(&self, record: StoredRecord) -> Result<()>;

    async fn fetch(&self, id: &str) -> Result<Option<StoredRecord>>;

    async fn delete(&self, id: &str) -> Result<()>;
}
