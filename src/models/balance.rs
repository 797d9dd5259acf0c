//! Balance models
//!
//! Off-chain (Ark) and on-chain balances in satoshis.

use serde::{Deserialize, Serialize};

/// Ark (off-chain) balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArkBalance {
    /// Spendable VTXO value
    pub spendable: u64,
    /// Value locked in a round that has not settled yet
    #[serde(default)]
    pub pending_in_round: u64,
    /// Value being unilaterally exited
    #[serde(default)]
    pub pending_exit: u64,
}

impl ArkBalance {
    /// Balance with only a spendable amount.
    pub fn spendable(amount: u64) -> Self {
        Self {
            spendable: amount,
            ..Self::default()
        }
    }
}

/// On-chain balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainBalance {
    /// Confirmed, spendable UTXO value
    pub confirmed: u64,
    /// Unconfirmed UTXO value
    #[serde(default)]
    pub pending: u64,
}

impl OnchainBalance {
    /// Balance with only a confirmed amount.
    pub fn confirmed(amount: u64) -> Self {
        Self {
            confirmed: amount,
            ..Self::default()
        }
    }
}

/// Snapshot of everything the balance service knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletBalance {
    pub ark: Option<ArkBalance>,
    pub onchain: Option<OnchainBalance>,
    /// Sum of Ark spendable and on-chain confirmed, recomputed only when both
    /// sub-fetches of one refresh succeed
    pub total_spendable: Option<u64>,
}

/// Total spendable value across both layers.
pub fn total_spendable(ark: &ArkBalance, onchain: &OnchainBalance) -> u64 {
    ark.spendable.saturating_add(onchain.confirmed)
}
