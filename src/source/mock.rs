//! Scriptable in-memory data source
//!
//! Serves canned responses with an optional artificial latency and counts
//! every call per resource. Used by the test suites and the demo binary.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    AddressKind, ArkBalance, ArkInfo, OnchainBalance, Resource, Transaction,
};
use crate::source::DataSource;

// == Mock Responses ==
/// What each operation answers with.
#[derive(Debug, Clone)]
pub struct MockResponses {
    pub ark_balance: Result<ArkBalance>,
    pub onchain_balance: Result<OnchainBalance>,
    pub ark_address: Result<String>,
    pub onchain_address: Result<String>,
    pub transactions: Result<Vec<Transaction>>,
    pub block_height: Result<u64>,
    pub ark_info: Result<ArkInfo>,
    pub wallet_exists: Result<bool>,
    pub create_wallet: Result<()>,
}

impl Default for MockResponses {
    fn default() -> Self {
        Self {
            ark_balance: Ok(ArkBalance::default()),
            onchain_balance: Ok(OnchainBalance::default()),
            ark_address: Ok("tark1qexampleaddress".to_string()),
            onchain_address: Ok("tb1qexampleaddress".to_string()),
            transactions: Ok(Vec::new()),
            block_height: Ok(0),
            ark_info: Ok(ArkInfo {
                network: "signet".to_string(),
                server_pubkey: String::new(),
                round_interval_secs: 30,
                vtxo_expiry_delta: 144,
            }),
            wallet_exists: Ok(true),
            create_wallet: Ok(()),
        }
    }
}

// == Mock Data Source ==
pub struct MockDataSource {
    responses: RwLock<MockResponses>,
    latency: RwLock<Duration>,
    calls: DashMap<Resource, usize>,
}

impl MockDataSource {
    // == Constructor ==
    pub fn new(responses: MockResponses) -> Self {
        Self {
            responses: RwLock::new(responses),
            latency: RwLock::new(Duration::ZERO),
            calls: DashMap::new(),
        }
    }

    /// Sets the delay every operation waits before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        Self {
            latency: RwLock::new(latency),
            ..self
        }
    }

    /// Changes the canned responses in place.
    pub async fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut MockResponses),
    {
        change(&mut *self.responses.write().await);
    }

    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// How many times the operation behind `resource` was invoked.
    pub fn calls(&self, resource: Resource) -> usize {
        self.calls.get(&resource).map(|count| *count).unwrap_or(0)
    }

    async fn respond<T, F>(&self, resource: Resource, pick: F) -> Result<T>
    where
        F: FnOnce(&MockResponses) -> Result<T>,
    {
        *self.calls.entry(resource).or_insert(0) += 1;
        debug!("Mock data source: fetching {}", resource);

        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        pick(&*self.responses.read().await)
    }
}

impl Default for MockDataSource {
    fn default() -> Self {
        Self::new(MockResponses::default())
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_ark_balance(&self) -> Result<ArkBalance> {
        self.respond(Resource::ArkBalance, |r| r.ark_balance.clone()).await
    }

    async fn fetch_onchain_balance(&self) -> Result<OnchainBalance> {
        self.respond(Resource::OnchainBalance, |r| r.onchain_balance.clone())
            .await
    }

    async fn fetch_address(&self, kind: AddressKind) -> Result<String> {
        self.respond(kind.resource(), |r| match kind {
            AddressKind::Ark => r.ark_address.clone(),
            AddressKind::Onchain => r.onchain_address.clone(),
        })
        .await
    }

    async fn fetch_transaction_history(&self) -> Result<Vec<Transaction>> {
        self.respond(Resource::TransactionHistory, |r| r.transactions.clone())
            .await
    }

    async fn fetch_block_height(&self) -> Result<u64> {
        self.respond(Resource::BlockHeight, |r| r.block_height.clone())
            .await
    }

    async fn fetch_ark_info(&self) -> Result<ArkInfo> {
        self.respond(Resource::ArkInfo, |r| r.ark_info.clone()).await
    }

    async fn wallet_exists(&self) -> Result<bool> {
        self.respond(Resource::Wallet, |r| r.wallet_exists.clone())
            .await
    }

    async fn create_wallet(&self) -> Result<()> {
        let created = self
            .respond(Resource::Wallet, |r| r.create_wallet.clone())
            .await;
        if created.is_ok() {
            self.responses.write().await.wallet_exists = Ok(true);
        }
        created
    }
}
