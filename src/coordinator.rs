//! Refresh Coordinator
//!
//! Top-level orchestrator: fans every resource service's refresh out
//! concurrently, joins on all of them, and folds their error slots into one
//! wallet-level error. Also tracks the loading state shown by the UI.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, WalletError};
use crate::flight::SingleFlight;
use crate::models::{RefreshTarget, Transaction, WalletAddresses, WalletBalance};
use crate::services::{AddressService, BalanceService, ChainService, TransactionService};
use crate::source::DataSource;
use crate::tasks::PersistenceHandle;

/// Single-flight key of a full refresh cycle
pub const REFRESH_KEY: &str = "refresh";
/// Single-flight key of wallet initialization
pub const INITIALIZE_KEY: &str = "initialize";

// == Refresh State ==
/// Loading state exposed to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshState {
    /// True exactly while a refresh cycle is registered as in flight
    pub is_refreshing: bool,
    /// Set once the first cycle completes, successful or not; never reset
    pub has_loaded_once: bool,
    pub last_error: Option<WalletError>,
}

/// Outcome of finished cycles. Whether a cycle is running is read from the
/// dispatcher, which releases the key however the cycle ends.
#[derive(Debug, Default)]
struct LoadState {
    has_loaded_once: bool,
    last_error: Option<WalletError>,
}

struct CoordinatorInner {
    source: Arc<dyn DataSource>,
    balance: BalanceService,
    addresses: AddressService,
    transactions: TransactionService,
    chain: ChainService,
    flights: SingleFlight<()>,
    state: RwLock<LoadState>,
}

// == Wallet Coordinator ==
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct WalletCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl WalletCoordinator {
    // == Constructor ==
    /// Builds the coordinator and its services.
    ///
    /// # Arguments
    /// * `source` - Remote backend every service fetches from
    /// * `persistence` - Queue of the persistence worker
    /// * `config` - Cache TTLs
    pub fn new(
        source: Arc<dyn DataSource>,
        persistence: PersistenceHandle,
        config: &Config,
    ) -> Self {
        let inner = CoordinatorInner {
            balance: BalanceService::new(Arc::clone(&source), persistence.clone()),
            addresses: AddressService::new(Arc::clone(&source), persistence.clone()),
            transactions: TransactionService::new(Arc::clone(&source), persistence.clone()),
            chain: ChainService::new(
                Arc::clone(&source),
                persistence,
                config.block_height_ttl(),
                config.ark_info_ttl(),
            ),
            source,
            flights: SingleFlight::new(),
            state: RwLock::new(LoadState::default()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    // == Initialize ==
    /// Creates the wallet if the backend has none, then runs a refresh.
    ///
    /// Concurrent calls share one initialization. This is the only command
    /// that fails hard, since there is no partial state to fall back to when
    /// the wallet cannot be created.
    pub async fn initialize(&self) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .flights
            .execute(INITIALIZE_KEY, move || async move {
                if !inner.source.wallet_exists().await? {
                    info!("No wallet found, creating one");
                    inner
                        .source
                        .create_wallet()
                        .await
                        .map_err(|err| WalletError::WalletCreation(err.to_string()))?;
                    info!("Wallet created");
                }
                inner.refresh().await;
                Ok(())
            })
            .await
    }

    // == Refresh ==
    /// Refreshes every resource service concurrently.
    ///
    /// A call made while a cycle is running joins that cycle. Never fails:
    /// per-service failures land in the services' error slots and in
    /// [`RefreshState::last_error`].
    pub async fn refresh(&self) {
        self.inner.refresh().await;
    }

    /// Refreshes one resource. Service refreshes re-aggregate the top-level
    /// error; block height and Ark info refreshes report their fetch error.
    pub async fn refresh_resource(&self, target: RefreshTarget) -> Result<()> {
        let inner = &self.inner;
        match target {
            RefreshTarget::Balance => inner.balance.refresh().await,
            RefreshTarget::Address => inner.addresses.refresh().await,
            RefreshTarget::Transactions => inner.transactions.refresh().await,
            RefreshTarget::BlockHeight => return inner.chain.fetch_block_height().await.map(|_| ()),
            RefreshTarget::ArkInfo => return inner.chain.fetch_ark_info().await.map(|_| ()),
        }
        inner.publish_aggregate_error().await;
        Ok(())
    }

    /// [`WalletCoordinator::refresh_resource`] by name (`balance`, `address`,
    /// `transactions`, `blockHeight`, `arkInfo`).
    pub async fn refresh_resource_named(&self, name: &str) -> Result<()> {
        self.refresh_resource(name.parse()?).await
    }

    // == Mutations ==
    /// Callback for after any state-mutating wallet operation completed.
    pub async fn after_mutation(&self) {
        self.refresh_resource(RefreshTarget::Balance)
            .await
            .unwrap_or_else(|err| warn!("Post-mutation refresh failed: {}", err));
    }

    /// Runs a state-mutating operation (send, board, exit, ...) and refreshes
    /// the balance once it succeeded.
    pub async fn run_mutation<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn DataSource>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let outcome = operation(Arc::clone(&self.inner.source)).await?;
        self.after_mutation().await;
        Ok(outcome)
    }

    // == Cancellation ==
    /// Cancels every in-flight fetch and cycle. Returns how many were running.
    pub fn cancel_all(&self) -> usize {
        let inner = &self.inner;
        inner.flights.cancel_all()
            + inner.balance.cancel_all()
            + inner.addresses.cancel_all()
            + inner.transactions.cancel_all()
            + inner.chain.cancel_all()
    }

    // == Observers ==
    pub async fn refresh_state(&self) -> RefreshState {
        let state = self.inner.state.read().await;
        RefreshState {
            is_refreshing: self.is_refreshing(),
            has_loaded_once: state.has_loaded_once,
            last_error: state.last_error.clone(),
        }
    }

    /// True while a refresh cycle is in flight, including one started by
    /// [`WalletCoordinator::initialize`].
    pub fn is_refreshing(&self) -> bool {
        self.inner.flights.is_running(REFRESH_KEY)
    }

    pub async fn has_loaded_once(&self) -> bool {
        self.inner.state.read().await.has_loaded_once
    }

    /// Wallet-level error: the first service error in priority order.
    pub async fn error(&self) -> Option<WalletError> {
        self.inner.state.read().await.last_error.clone()
    }

    pub async fn current_balance(&self) -> WalletBalance {
        self.inner.balance.balance().await
    }

    pub async fn current_address(&self) -> Option<String> {
        self.inner.addresses.current_address().await
    }

    pub async fn addresses(&self) -> WalletAddresses {
        self.inner.addresses.addresses().await
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.inner.transactions.transactions().await
    }

    /// Extrapolated block height; fetches once if nothing is cached yet.
    pub async fn estimated_block_height(&self) -> Option<u64> {
        self.inner.chain.estimated_block_height().await
    }

    pub fn balance_service(&self) -> &BalanceService {
        &self.inner.balance
    }

    pub fn address_service(&self) -> &AddressService {
        &self.inner.addresses
    }

    pub fn transaction_service(&self) -> &TransactionService {
        &self.inner.transactions
    }

    pub fn chain_service(&self) -> &ChainService {
        &self.inner.chain
    }
}

impl CoordinatorInner {
    async fn refresh(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        let outcome = self
            .flights
            .execute(REFRESH_KEY, move || async move {
                inner.run_cycle().await;
                Ok(())
            })
            .await;

        if let Err(err) = outcome {
            warn!("Refresh cycle aborted: {}", err);
        }
    }

    async fn run_cycle(&self) {
        info!("Refresh cycle started");

        tokio::join!(
            self.addresses.refresh(),
            self.transactions.refresh(),
            self.balance.refresh(),
        );

        let error = self.aggregate_error().await;
        let mut state = self.state.write().await;
        state.has_loaded_once = true;
        match &error {
            Some(err) => warn!("Refresh cycle finished with error: {}", err),
            None => info!("Refresh cycle finished"),
        }
        state.last_error = error;
    }

    /// First non-empty error slot, in order: address, transactions, balance.
    async fn aggregate_error(&self) -> Option<WalletError> {
        if let Some(err) = self.addresses.error().await {
            return Some(err);
        }
        if let Some(err) = self.transactions.error().await {
            return Some(err);
        }
        self.balance.error().await
    }

    async fn publish_aggregate_error(&self) {
        let error = self.aggregate_error().await;
        self.state.write().await.last_error = error;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::{ArkBalance, Resource};
    use crate::source::{MockDataSource, MockResponses};
    use crate::store::MemoryStore;
    use crate::tasks::spawn_persistence_task;

    fn build(source: Arc<MockDataSource>) -> WalletCoordinator {
        let (persistence, _worker) = spawn_persistence_task(Arc::new(MemoryStore::new()), 64);
        WalletCoordinator::new(source, persistence, &Config::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state() {
        let coordinator = build(Arc::new(MockDataSource::default()));

        assert_eq!(coordinator.refresh_state().await, RefreshState::default());
        assert!(coordinator.current_address().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_marks_loaded() {
        let coordinator = build(Arc::new(MockDataSource::default()));

        coordinator.refresh().await;

        let state = coordinator.refresh_state().await;
        assert!(!state.is_refreshing);
        assert!(state.has_loaded_once);
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_refreshing_during_cycle() {
        let source = Arc::new(MockDataSource::default().with_latency(Duration::from_millis(500)));
        let coordinator = build(source);

        let cycle = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }
        assert!(!coordinator.has_loaded_once().await);

        cycle.await.unwrap();
        assert!(!coordinator.is_refreshing());
        assert!(coordinator.has_loaded_once().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_priority_address_first() {
        let address_err = WalletError::fetch(Resource::ArkAddress, "a");
        let tx_err = WalletError::fetch(Resource::TransactionHistory, "t");
        let balance_err = WalletError::fetch(Resource::ArkBalance, "b");
        let source = Arc::new(MockDataSource::new(MockResponses {
            ark_address: Err(address_err.clone()),
            transactions: Err(tx_err.clone()),
            ark_balance: Err(balance_err.clone()),
            ..MockResponses::default()
        }));
        let coordinator = build(source.clone());

        coordinator.refresh().await;
        assert_eq!(coordinator.error().await, Some(address_err));

        source.update(|r| r.ark_address = Ok("tark1q".to_string())).await;
        coordinator.refresh().await;
        assert_eq!(coordinator.error().await, Some(tx_err));

        source.update(|r| r.transactions = Ok(Vec::new())).await;
        coordinator.refresh().await;
        assert_eq!(coordinator.error().await, Some(balance_err));

        source.update(|r| r.ark_balance = Ok(ArkBalance::spendable(1))).await;
        coordinator.refresh().await;
        assert_eq!(coordinator.error().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_resource_reaggregates_error() {
        let failure = WalletError::fetch(Resource::ArkBalance, "down");
        let source = Arc::new(MockDataSource::new(MockResponses {
            ark_balance: Err(failure.clone()),
            ..MockResponses::default()
        }));
        let coordinator = build(source.clone());
        coordinator.refresh().await;
        assert_eq!(coordinator.error().await, Some(failure));

        source.update(|r| r.ark_balance = Ok(ArkBalance::spendable(9))).await;
        coordinator.refresh_resource(RefreshTarget::Balance).await.unwrap();

        assert_eq!(coordinator.error().await, None);
        assert_eq!(coordinator.current_balance().await.ark, Some(ArkBalance::spendable(9)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_resource_named_unknown() {
        let coordinator = build(Arc::new(MockDataSource::default()));

        let err = coordinator.refresh_resource_named("utxos").await.unwrap_err();
        assert_eq!(err, WalletError::UnknownResource("utxos".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_resource_block_height_reports_failure() {
        let failure = WalletError::fetch(Resource::BlockHeight, "timeout");
        let source = Arc::new(MockDataSource::new(MockResponses {
            block_height: Err(failure.clone()),
            ..MockResponses::default()
        }));
        let coordinator = build(source);

        let outcome = coordinator.refresh_resource_named("blockHeight").await;
        assert_eq!(outcome, Err(failure));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_creates_missing_wallet() {
        let source = Arc::new(MockDataSource::new(MockResponses {
            wallet_exists: Ok(false),
            ..MockResponses::default()
        }));
        let coordinator = build(source.clone());

        coordinator.initialize().await.unwrap();

        assert_eq!(source.wallet_exists().await, Ok(true));
        assert!(coordinator.has_loaded_once().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_fails_when_creation_fails() {
        let source = Arc::new(MockDataSource::new(MockResponses {
            wallet_exists: Ok(false),
            create_wallet: Err(WalletError::fetch(Resource::Wallet, "disk full")),
            ..MockResponses::default()
        }));
        let coordinator = build(source);

        let err = coordinator.initialize().await.unwrap_err();

        assert!(matches!(err, WalletError::WalletCreation(_)));
        assert!(!coordinator.has_loaded_once().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_mutation_refreshes_balance() {
        let source = Arc::new(MockDataSource::default());
        let coordinator = build(source.clone());

        let sent = coordinator
            .run_mutation(|_source| async { Ok("txid") })
            .await
            .unwrap();

        assert_eq!(sent, "txid");
        assert_eq!(source.calls(Resource::ArkBalance), 1);
        assert_eq!(source.calls(Resource::TransactionHistory), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_mutation_skips_refresh() {
        let source = Arc::new(MockDataSource::default());
        let coordinator = build(source.clone());

        let outcome: Result<()> = coordinator
            .run_mutation(|_source| async { Err(WalletError::Internal("rejected".to_string())) })
            .await;

        assert!(outcome.is_err());
        assert_eq!(source.calls(Resource::ArkBalance), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_cycle_returns_to_idle() {
        let source = Arc::new(MockDataSource::default().with_latency(Duration::from_secs(10)));
        let coordinator = build(source);

        let cycle = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }

        assert!(coordinator.cancel_all() > 0);
        cycle.await.unwrap();

        assert!(!coordinator.is_refreshing());
        assert!(!coordinator.refresh_state().await.is_refreshing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_initialize_returns_to_idle() {
        let source = Arc::new(MockDataSource::default().with_latency(Duration::from_secs(10)));
        let coordinator = build(source);

        let init = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.initialize().await }
        });
        // The cycle starts once the wallet check has returned
        while !coordinator.is_refreshing() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert!(coordinator.cancel_all() > 0);
        assert_eq!(init.await.unwrap(), Err(WalletError::Cancelled));

        assert!(!coordinator.is_refreshing());
        tokio::time::sleep(Duration::from_secs(60)).await;
        let state = coordinator.refresh_state().await;
        assert!(!state.is_refreshing);
        assert!(!state.has_loaded_once);

        // The next cycle runs normally
        coordinator.refresh().await;
        assert!(coordinator.has_loaded_once().await);
        assert!(!coordinator.is_refreshing());
    }
}
