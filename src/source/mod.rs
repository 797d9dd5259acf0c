//! Data Source Module
//!
//! The remote backend the wallet core fetches from. The core only sees
//! asynchronous operations that produce a value or fail; how they reach the
//! backend (subprocess, HTTP, RPC) is up to the implementation.

mod mock;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AddressKind, ArkBalance, ArkInfo, OnchainBalance, Transaction};

pub use mock::{MockDataSource, MockResponses};

// == Data Source ==
/// Remote operations consumed by the services and the coordinator.
///
/// Implementations report transport problems as
/// [`WalletError::FetchFailed`](crate::error::WalletError::FetchFailed) and
/// unreadable payloads as
/// [`WalletError::DecodeFailed`](crate::error::WalletError::DecodeFailed).
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    async fn fetch_ark_balance(&self) -> Result<ArkBalance>;

    async fn fetch_onchain_balance(&self) -> Result<OnchainBalance>;

    async fn fetch_address(&self, kind: AddressKind) -> Result<String>;

    async fn fetch_transaction_history(&self) -> Result<Vec<Transaction>>;

    async fn fetch_block_height(&self) -> Result<u64>;

    async fn fetch_ark_info(&self) -> Result<ArkInfo>;

    /// Whether a wallet already exists on the backend.
    async fn wallet_exists(&self) -> Result<bool>;

    /// Creates the wallet on the backend.
    async fn create_wallet(&self) -> Result<()>;
}
