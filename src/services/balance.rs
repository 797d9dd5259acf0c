//! Balance Service
//!
//! Fetches the Ark and on-chain balances concurrently and maintains their
//! total.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{Result, WalletError};
use crate::flight::SingleFlight;
use crate::models::{total_spendable, ArkBalance, OnchainBalance, Resource, WalletBalance};
use crate::source::DataSource;
use crate::tasks::PersistenceHandle;

// == Balance State ==
#[derive(Debug, Clone, Default)]
pub struct BalanceState {
    pub balance: WalletBalance,
    pub error: Option<WalletError>,
}

// == Balance Service ==
pub struct BalanceService {
    source: Arc<dyn DataSource>,
    persistence: PersistenceHandle,
    ark_flight: SingleFlight<ArkBalance>,
    onchain_flight: SingleFlight<OnchainBalance>,
    state: RwLock<BalanceState>,
}

impl BalanceService {
    pub fn new(source: Arc<dyn DataSource>, persistence: PersistenceHandle) -> Self {
        Self {
            source,
            persistence,
            ark_flight: SingleFlight::new(),
            onchain_flight: SingleFlight::new(),
            state: RwLock::new(BalanceState::default()),
        }
    }

    // == Deduplicated Fetches ==
    /// Fetches the Ark balance, joining any fetch already in flight.
    pub async fn fetch_ark_balance(&self) -> Result<ArkBalance> {
        let source = Arc::clone(&self.source);
        self.ark_flight
            .execute(Resource::ArkBalance.key(), move || async move {
                source.fetch_ark_balance().await
            })
            .await
    }

    /// Fetches the on-chain balance, joining any fetch already in flight.
    pub async fn fetch_onchain_balance(&self) -> Result<OnchainBalance> {
        let source = Arc::clone(&self.source);
        self.onchain_flight
            .execute(Resource::OnchainBalance.key(), move || async move {
                source.fetch_onchain_balance().await
            })
            .await
    }

    // == Refresh ==
    /// Refreshes both balances.
    ///
    /// Each sub-balance that was fetched is stored. The total is only
    /// recomputed when both succeeded; otherwise the previous total stays and
    /// the first error is recorded.
    pub async fn refresh(&self) {
        let (ark, onchain) = tokio::join!(self.fetch_ark_balance(), self.fetch_onchain_balance());

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let mut first_error = None;

        match ark {
            Ok(balance) => {
                self.persistence.submit(Resource::ArkBalance, &balance);
                state.balance.ark = Some(balance);
            }
            Err(err) => {
                warn!("Balance refresh: {}", err);
                first_error.get_or_insert(err);
            }
        }

        match onchain {
            Ok(balance) => {
                self.persistence.submit(Resource::OnchainBalance, &balance);
                state.balance.onchain = Some(balance);
            }
            Err(err) => {
                warn!("Balance refresh: {}", err);
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            None => {
                if let (Some(ark), Some(onchain)) = (&state.balance.ark, &state.balance.onchain) {
                    let total = total_spendable(ark, onchain);
                    state.balance.total_spendable = Some(total);
                    debug!("Balance refreshed: total spendable {} sat", total);
                }
                state.error = None;
            }
            Some(err) => state.error = Some(err),
        }
    }

    // == Observers ==
    pub async fn balance(&self) -> WalletBalance {
        self.state.read().await.balance.clone()
    }

    pub async fn error(&self) -> Option<WalletError> {
        self.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> BalanceState {
        self.state.read().await.clone()
    }

    /// Cancels in-flight balance fetches.
    pub fn cancel_all(&self) -> usize {
        self.ark_flight.cancel_all() + self.onchain_flight.cancel_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::source::{MockDataSource, MockResponses};
    use crate::store::{MemoryStore, WalletStore};
    use crate::tasks::spawn_persistence_task;

    fn build(source: Arc<MockDataSource>) -> (BalanceService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let (persistence, _worker) = spawn_persistence_task(store.clone(), 16);
        (BalanceService::new(source, persistence), store)
    }

    fn responses(ark: u64, onchain: u64) -> MockResponses {
        MockResponses {
            ark_balance: Ok(ArkBalance::spendable(ark)),
            onchain_balance: Ok(OnchainBalance::confirmed(onchain)),
            ..MockResponses::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_computes_total() {
        let source = Arc::new(MockDataSource::new(responses(50_000, 20_000)));
        let (service, _store) = build(source);

        service.refresh().await;

        let state = service.snapshot().await;
        assert_eq!(state.balance.total_spendable, Some(70_000));
        assert_eq!(state.balance.ark, Some(ArkBalance::spendable(50_000)));
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_keeps_previous_total() {
        let source = Arc::new(MockDataSource::new(responses(50_000, 20_000)));
        let (service, _store) = build(source.clone());
        service.refresh().await;

        let failure = WalletError::fetch(Resource::OnchainBalance, "esplora unreachable");
        source
            .update(|r| {
                r.ark_balance = Ok(ArkBalance::spendable(60_000));
                r.onchain_balance = Err(failure.clone());
            })
            .await;
        service.refresh().await;

        let state = service.snapshot().await;
        assert_eq!(state.balance.ark, Some(ArkBalance::spendable(60_000)));
        assert_eq!(state.balance.onchain, Some(OnchainBalance::confirmed(20_000)));
        assert_eq!(state.balance.total_spendable, Some(70_000));
        assert_eq!(state.error, Some(failure));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_error() {
        let failure = WalletError::fetch(Resource::ArkBalance, "bark exited");
        let source = Arc::new(MockDataSource::new(MockResponses {
            ark_balance: Err(failure.clone()),
            ..responses(0, 1)
        }));
        let (service, _store) = build(source.clone());

        service.refresh().await;
        assert_eq!(service.error().await, Some(failure));
        assert_eq!(service.balance().await.total_spendable, None);

        source.update(|r| r.ark_balance = Ok(ArkBalance::spendable(2))).await;
        service.refresh().await;
        assert_eq!(service.error().await, None);
        assert_eq!(service.balance().await.total_spendable, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_ark_fetches_are_deduplicated() {
        let source = Arc::new(
            MockDataSource::new(responses(50_000, 0)).with_latency(Duration::from_millis(500)),
        );
        let (service, _store) = build(source.clone());

        let (a, b) = tokio::join!(service.fetch_ark_balance(), service.fetch_ark_balance());

        assert_eq!(a, Ok(ArkBalance::spendable(50_000)));
        assert_eq!(b, Ok(ArkBalance::spendable(50_000)));
        assert_eq!(source.calls(Resource::ArkBalance), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_persists_balances() {
        let source = Arc::new(MockDataSource::new(responses(5, 6)));
        let (service, store) = build(source);

        service.refresh().await;
        // Let the persistence worker drain
        tokio::time::sleep(Duration::from_millis(10)).await;

        let ark = store.fetch("arkBalance").await.unwrap().unwrap();
        assert_eq!(ark.payload["spendable"], 5);
        assert!(store.fetch("onchainBalance").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_failure_does_not_surface() {
        let source = Arc::new(MockDataSource::new(responses(5, 6)));
        let (service, store) = build(source);
        store.set_fail_writes(true);

        service.refresh().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(service.error().await, None);
        assert_eq!(service.balance().await.total_spendable, Some(11));
    }
}
