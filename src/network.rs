//! Network URL constants, chain identifiers and per-network signing parameters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Mainnet REST API base URL.
pub const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";

/// Testnet REST API base URL.
pub const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Mainnet WebSocket URL.
pub const MAINNET_WS_URL: &str = "wss://api.hyperliquid.xyz/ws";

/// Testnet WebSocket URL.
pub const TESTNET_WS_URL: &str = "wss://api.hyperliquid-testnet.xyz/ws";

/// Default signature chain id on mainnet (Arbitrum One).
pub const MAINNET_SIGNATURE_CHAIN_ID: SignatureChainId = SignatureChainId(0xa4b1);

/// Default signature chain id on testnet (Arbitrum Sepolia).
pub const TESTNET_SIGNATURE_CHAIN_ID: SignatureChainId = SignatureChainId(0x66eee);

/// Chain id of the L1 action signing domain. Fixed by the venue.
pub const L1_SIGNING_CHAIN_ID: u64 = 1337;

// ─── Network ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn api_url(&self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_API_URL,
            Self::Testnet => TESTNET_API_URL,
        }
    }

    pub fn ws_url(&self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_WS_URL,
            Self::Testnet => TESTNET_WS_URL,
        }
    }

    /// Chain id used for user-signed actions when the wallet does not supply one.
    pub fn default_signature_chain_id(&self) -> SignatureChainId {
        match self {
            Self::Mainnet => MAINNET_SIGNATURE_CHAIN_ID,
            Self::Testnet => TESTNET_SIGNATURE_CHAIN_ID,
        }
    }

    /// `source` field of the phantom agent signed for L1 actions.
    pub fn agent_source(&self) -> &'static str {
        match self {
            Self::Mainnet => "a",
            Self::Testnet => "b",
        }
    }

    /// `hyperliquidChain` field of user-signed actions.
    pub fn hyperliquid_chain(&self) -> &'static str {
        match self {
            Self::Mainnet => "Mainnet",
            Self::Testnet => "Testnet",
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Self::Testnet)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hyperliquid_chain())
    }
}

// ─── SignatureChainId ────────────────────────────────────────────────────────

/// EVM chain id placed in the user-signed EIP-712 domain.
///
/// Serializes as a lowercase `0x`-prefixed hex string (e.g. `"0xa4b1"`), which is
/// how the venue expects it inside `signatureChainId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureChainId(pub u64);

impl SignatureChainId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SignatureChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl From<u64> for SignatureChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for SignatureChainId {
    type Err = String;

    /// Accepts `0x`-prefixed hex or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        parsed
            .map(SignatureChainId)
            .map_err(|e| format!("invalid chain id {s:?}: {e}"))
    }
}

impl Serialize for SignatureChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SignatureChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
