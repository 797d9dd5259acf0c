//! Domain models for the wallet core
//!
//! Plain data types shared by the data source, the services, and the
//! persistent store.

pub mod address;
pub mod ark_info;
pub mod balance;
pub mod resource;
pub mod transaction;

// Re-export commonly used types
pub use address::{AddressKind, WalletAddresses};
pub use ark_info::ArkInfo;
pub use balance::{total_spendable, ArkBalance, OnchainBalance, WalletBalance};
pub use resource::{RefreshTarget, Resource};
pub use transaction::{sort_newest_first, Transaction, TransactionKind};
