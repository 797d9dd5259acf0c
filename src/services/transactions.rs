//! Transaction History Service

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{Result, WalletError};
use crate::flight::SingleFlight;
use crate::models::{sort_newest_first, Resource, Transaction};
use crate::source::DataSource;
use crate::tasks::PersistenceHandle;

#[derive(Debug, Clone, Default)]
pub struct TransactionState {
    /// Newest first
    pub transactions: Vec<Transaction>,
    pub error: Option<WalletError>,
}

// == Transaction Service ==
pub struct TransactionService {
    source: Arc<dyn DataSource>,
    persistence: PersistenceHandle,
    flight: SingleFlight<Vec<Transaction>>,
    state: RwLock<TransactionState>,
}

impl TransactionService {
    pub fn new(source: Arc<dyn DataSource>, persistence: PersistenceHandle) -> Self {
        Self {
            source,
            persistence,
            flight: SingleFlight::new(),
            state: RwLock::new(TransactionState::default()),
        }
    }

    /// Fetches the full history, joining any fetch in flight.
    pub async fn fetch_history(&self) -> Result<Vec<Transaction>> {
        let source = Arc::clone(&self.source);
        self.flight
            .execute(Resource::TransactionHistory.key(), move || async move {
                let mut history = source.fetch_transaction_history().await?;
                sort_newest_first(&mut history);
                Ok(history)
            })
            .await
    }

    // == Refresh ==
    pub async fn refresh(&self) {
        let outcome = self.fetch_history().await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(history) => {
                debug!("Transaction refresh: {} entries", history.len());
                self.persistence.submit(Resource::TransactionHistory, &history);
                state.transactions = history;
                state.error = None;
            }
            Err(err) => {
                warn!("Transaction refresh: {}", err);
                state.error = Some(err);
            }
        }
    }

    // == Observers ==
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.clone()
    }

    pub async fn error(&self) -> Option<WalletError> {
        self.state.read().await.error.clone()
    }

    pub fn cancel_all(&self) -> usize {
        self.flight.cancel_all()
    }
}
