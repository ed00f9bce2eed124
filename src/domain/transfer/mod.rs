//! User-signed actions — transfers, withdrawals, agent approval.
//!
//! These are signed as EIP-712 `HyperliquidTransaction:*` structs under the
//! wallet's signature chain id, not through the L1 phantom agent. Each carries
//! `signatureChainId` and `hyperliquidChain`, and a `time`/`nonce` equal to the
//! request nonce. All three are bound by the exchange client before signing.

use crate::network::{Network, SignatureChainId};
use crate::shared::Address;
use serde::{Deserialize, Serialize};

/// Chain binding shared by every user-signed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBinding {
    pub signature_chain_id: SignatureChainId,
    pub hyperliquid_chain: String,
}

impl ChainBinding {
    pub fn new(network: Network, signature_chain_id: SignatureChainId) -> Self {
        Self {
            signature_chain_id,
            hyperliquid_chain: network.hyperliquid_chain().to_string(),
        }
    }
}

impl Default for ChainBinding {
    fn default() -> Self {
        let network = Network::default();
        Self::new(network, network.default_signature_chain_id())
    }
}

/// Transfer USDC between perp accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdSend {
    #[serde(flatten)]
    pub chain: ChainBinding,
    pub destination: Address,
    pub amount: String,
    pub time: u64,
}

impl UsdSend {
    pub fn new(destination: Address, amount: impl Into<String>) -> Self {
        Self {
            chain: ChainBinding::default(),
            destination,
            amount: amount.into(),
            time: 0,
        }
    }
}

/// Transfer a spot token (`token` is `NAME:0x<token id>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotSend {
    #[serde(flatten)]
    pub chain: ChainBinding,
    pub destination: Address,
    pub token: String,
    pub amount: String,
    pub time: u64,
}

impl SpotSend {
    pub fn new(destination: Address, token: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            chain: ChainBinding::default(),
            destination,
            token: token.into(),
            amount: amount.into(),
            time: 0,
        }
    }
}

/// Withdraw USDC to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdraw3 {
    #[serde(flatten)]
    pub chain: ChainBinding,
    pub destination: Address,
    pub amount: String,
    pub time: u64,
}

impl Withdraw3 {
    pub fn new(destination: Address, amount: impl Into<String>) -> Self {
        Self {
            chain: ChainBinding::default(),
            destination,
            amount: amount.into(),
            time: 0,
        }
    }
}

/// Move USDC between the spot and perp balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdClassTransfer {
    #[serde(flatten)]
    pub chain: ChainBinding,
    pub amount: String,
    pub to_perp: bool,
    pub nonce: u64,
}

impl UsdClassTransfer {
    pub fn new(amount: impl Into<String>, to_perp: bool) -> Self {
        Self {
            chain: ChainBinding::default(),
            amount: amount.into(),
            to_perp,
            nonce: 0,
        }
    }
}

/// Authorize an agent key to sign L1 actions for this account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAgent {
    #[serde(flatten)]
    pub chain: ChainBinding,
    pub agent_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub nonce: u64,
}

impl ApproveAgent {
    pub fn new(agent_address: Address, agent_name: Option<String>) -> Self {
        Self {
            chain: ChainBinding::default(),
            agent_address,
            agent_name,
            nonce: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_send_wire_shape() {
        let mut action = UsdSend::new(Address::repeat_byte(0xab), "1.5");
        action.chain = ChainBinding::new(Network::Testnet, SignatureChainId(0x66eee));
        action.time = 1_700_000_000_000;

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["signatureChainId"], "0x66eee");
        assert_eq!(json["hyperliquidChain"], "Testnet");
        assert_eq!(
            json["destination"],
            "0xabababababababababababababababababababab"
        );
        assert_eq!(json["amount"], "1.5");
        assert_eq!(json["time"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_approve_agent_omits_missing_name() {
        let action = ApproveAgent::new(Address::zero(), None);
        let json = serde_json::to_value(&action).unwrap();
        assert!(json.get("agentName").is_none());
        assert_eq!(json["hyperliquidChain"], "Mainnet");
    }
}
