//! Ark server protocol parameters

use serde::{Deserialize, Serialize};

/// Protocol parameters advertised by the Ark server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArkInfo {
    /// Bitcoin network the server runs on
    pub network: String,
    /// Server public key, hex encoded
    pub server_pubkey: String,
    /// Seconds between settlement rounds
    pub round_interval_secs: u64,
    /// Blocks before a VTXO expires
    #[serde(default)]
    pub vtxo_expiry_delta: u32,
}
