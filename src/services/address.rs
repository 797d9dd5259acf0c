//! Address Service
//!
//! Keeps the current Ark and on-chain receive addresses.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::error::{Result, WalletError};
use crate::flight::SingleFlight;
use crate::models::{AddressKind, WalletAddresses};
use crate::source::DataSource;
use crate::tasks::PersistenceHandle;

#[derive(Debug, Clone, Default)]
pub struct AddressState {
    pub addresses: WalletAddresses,
    pub error: Option<WalletError>,
}

// == Address Service ==
pub struct AddressService {
    source: Arc<dyn DataSource>,
    persistence: PersistenceHandle,
    /// One dispatcher, keyed per address kind
    flight: SingleFlight<String>,
    state: RwLock<AddressState>,
}

impl AddressService {
    pub fn new(source: Arc<dyn DataSource>, persistence: PersistenceHandle) -> Self {
        Self {
            source,
            persistence,
            flight: SingleFlight::new(),
            state: RwLock::new(AddressState::default()),
        }
    }

    /// Fetches one address, joining any fetch of the same kind in flight.
    pub async fn fetch_address(&self, kind: AddressKind) -> Result<String> {
        let source = Arc::clone(&self.source);
        self.flight
            .execute(kind.resource().key(), move || async move {
                source.fetch_address(kind).await
            })
            .await
    }

    // == Refresh ==
    /// Refreshes both addresses concurrently.
    pub async fn refresh(&self) {
        let (ark, onchain) = tokio::join!(
            self.fetch_address(AddressKind::Ark),
            self.fetch_address(AddressKind::Onchain)
        );

        let mut state = self.state.write().await;
        let mut first_error = None;

        for (kind, outcome) in [(AddressKind::Ark, ark), (AddressKind::Onchain, onchain)] {
            match outcome {
                Ok(address) => {
                    self.persistence.submit(kind.resource(), &address);
                    *state.addresses.slot_mut(kind) = Some(address);
                }
                Err(err) => {
                    warn!("Address refresh: {}", err);
                    first_error.get_or_insert(err);
                }
            }
        }

        state.error = first_error;
    }

    // == Observers ==
    pub async fn addresses(&self) -> WalletAddresses {
        self.state.read().await.addresses.clone()
    }

    /// The Ark receive address, the one shown by default.
    pub async fn current_address(&self) -> Option<String> {
        self.state.read().await.addresses.ark.clone()
    }

    pub async fn error(&self) -> Option<WalletError> {
        self.state.read().await.error.clone()
    }

    pub fn cancel_all(&self) -> usize {
        self.flight.cancel_all()
    }
}
