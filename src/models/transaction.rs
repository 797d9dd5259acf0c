//! Transaction history models

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a history entry did to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Received,
    Sent,
    Boarded,
    Exited,
}

/// A single history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    pub kind: TransactionKind,
    /// Signed amount in satoshis, negative for outgoing
    pub amount: i64,
    /// Confirmation time, None while unconfirmed
    pub timestamp: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_confirmed(&self) -> bool {
        self.timestamp.is_some()
    }
}

/// Sorts newest first; unconfirmed entries go ahead of confirmed ones.
pub fn sort_newest_first(history: &mut [Transaction]) {
    history.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(ta), Some(tb)) => tb.cmp(&ta),
    });
}
