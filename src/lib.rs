//! Wallet Core - Asynchronous data orchestration for an Ark wallet
//!
//! Deduplicates concurrent fetches, caches time-sensitive values with TTLs,
//! extrapolates block height between fetches, and refreshes balances,
//! addresses and transaction history in parallel into one consistent state.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod estimator;
pub mod flight;
pub mod models;
pub mod services;
pub mod source;
pub mod store;
pub mod tasks;

pub use config::Config;
pub use coordinator::{RefreshState, WalletCoordinator};
pub use error::{Result, WalletError};
pub use tasks::{spawn_persistence_task, spawn_refresh_task};
