//! Vault domain — creation and deposits / withdrawals.

use crate::shared::Address;
use serde::{Deserialize, Serialize};

/// Minimum initial deposit the venue accepts, in micro-USD.
pub const MIN_INITIAL_VAULT_DEPOSIT: u64 = 100_000_000;

/// Create a vault. `nonce` is bound to the request nonce when the action is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVault {
    pub name: String,
    pub description: String,
    /// Initial deposit in micro-USD (1 USD = 1_000_000).
    pub initial_usd: u64,
    pub nonce: u64,
}

impl CreateVault {
    pub fn new(name: impl Into<String>, description: impl Into<String>, initial_usd: u64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            initial_usd,
            nonce: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTransfer {
    pub vault_address: Address,
    pub is_deposit: bool,
    /// Amount in micro-USD.
    pub usd: u64,
}
