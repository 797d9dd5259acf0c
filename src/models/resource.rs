//! Resource names
//!
//! Stable identifiers for every remotely fetched item, used both as
//! single-flight keys and as persistent store record ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;

// == Resource ==
/// A remotely fetched item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    ArkBalance,
    OnchainBalance,
    ArkAddress,
    OnchainAddress,
    TransactionHistory,
    BlockHeight,
    ArkInfo,
    Wallet,
}

impl Resource {
    /// Dispatcher key and store id for this resource.
    pub fn key(&self) -> &'static str {
        match self {
            Resource::ArkBalance => "arkBalance",
            Resource::OnchainBalance => "onchainBalance",
            Resource::ArkAddress => "arkAddress",
            Resource::OnchainAddress => "onchainAddress",
            Resource::TransactionHistory => "transactionHistory",
            Resource::BlockHeight => "blockHeight",
            Resource::ArkInfo => "arkInfo",
            Resource::Wallet => "wallet",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// == Refresh Target ==
/// What a consumer may ask the coordinator to refresh individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshTarget {
    Balance,
    Address,
    Transactions,
    BlockHeight,
    ArkInfo,
}

impl RefreshTarget {
    /// Every refresh target, in no particular order.
    pub const ALL: [RefreshTarget; 5] = [
        RefreshTarget::Balance,
        RefreshTarget::Address,
        RefreshTarget::Transactions,
        RefreshTarget::BlockHeight,
        RefreshTarget::ArkInfo,
    ];

    /// The name accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            RefreshTarget::Balance => "balance",
            RefreshTarget::Address => "address",
            RefreshTarget::Transactions => "transactions",
            RefreshTarget::BlockHeight => "blockHeight",
            RefreshTarget::ArkInfo => "arkInfo",
        }
    }
}

impl fmt::Display for RefreshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RefreshTarget {
    type Err = WalletError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        RefreshTarget::ALL
            .into_iter()
            .find(|target| target.name() == name)
            .ok_or_else(|| WalletError::UnknownResource(name.to_string()))
    }
}
