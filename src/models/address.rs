//! Address models

use serde::{Deserialize, Serialize};

use crate::models::Resource;

/// Which layer an address receives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Ark,
    Onchain,
}

impl AddressKind {
    /// The resource this kind of address is fetched as.
    pub fn resource(&self) -> Resource {
        match self {
            AddressKind::Ark => Resource::ArkAddress,
            AddressKind::Onchain => Resource::OnchainAddress,
        }
    }
}

/// Current receive addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAddresses {
    pub ark: Option<String>,
    pub onchain: Option<String>,
}

impl WalletAddresses {
    /// Address slot for the given kind.
    pub fn get(&self, kind: AddressKind) -> Option<&str> {
        match kind {
            AddressKind::Ark => self.ark.as_deref(),
            AddressKind::Onchain => self.onchain.as_deref(),
        }
    }

    /// Mutable address slot for the given kind.
    pub fn slot_mut(&mut self, kind: AddressKind) -> &mut Option<String> {
        match kind {
            AddressKind::Ark => &mut self.ark,
            AddressKind::Onchain => &mut self.onchain,
        }
    }
}
