//! Wallet integrations.
//!
//! Every wallet is reached through [`ExchangeWallet`]. An adapter implements the
//! subset of chain capabilities it actually has:
//!
//! | Adapter             | static chain id | chain query          | signing            |
//! |---------------------|-----------------|----------------------|--------------------|
//! | [`LocalAccount`]    | optional        | —                    | local key          |
//! | [`ProviderWallet`]  | —               | `eth_chainId` via an ethers `Middleware` | local key |
//! | [`InjectedWallet`]  | —               | `eth_chainId` via EIP-1193 `request` | `eth_signTypedData_v4` |
//!
//! [`ChainIdResolver`] turns those capabilities into one signature chain id and
//! [`WalletSession`] memoizes it next to the wallet's nonce counter.

mod injected;
mod local;
mod nonce;
mod provider;
mod resolver;
mod session;

pub use injected::{Eip1193Provider, InjectedWallet};
pub use local::LocalAccount;
pub use nonce::NonceCounter;
pub use provider::ProviderWallet;
pub use resolver::ChainIdResolver;
pub use session::WalletSession;

use crate::error::WalletError;
use crate::network::SignatureChainId;
use crate::shared::Address;
use crate::signing::TypedPayload;
use async_trait::async_trait;
use ethers::types::Signature;

/// A signing identity the exchange client can act for.
#[async_trait]
pub trait ExchangeWallet: Send + Sync {
    fn address(&self) -> Address;

    /// Chain id the wallet carries without asking anyone.
    fn static_chain_id(&self) -> Option<SignatureChainId> {
        None
    }

    /// Ask the wallet's provider which chain it is on. `Ok(None)` when the
    /// wallet has no provider to ask.
    async fn query_chain_id(&self) -> Result<Option<SignatureChainId>, WalletError> {
        Ok(None)
    }

    /// Sign an EIP-712 payload. `v` must be 27 or 28.
    async fn sign_typed_data(&self, payload: &TypedPayload) -> Result<Signature, WalletError>;
}

#[async_trait]
impl<W: ExchangeWallet + ?Sized> ExchangeWallet for std::sync::Arc<W> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn static_chain_id(&self) -> Option<SignatureChainId> {
        (**self).static_chain_id()
    }

    async fn query_chain_id(&self) -> Result<Option<SignatureChainId>, WalletError> {
        (**self).query_chain_id().await
    }

    async fn sign_typed_data(&self, payload: &TypedPayload) -> Result<Signature, WalletError> {
        (**self).sign_typed_data(payload).await
    }
}

/// Parse a chain id as wallets report it: `"0x1"`, `1`, or `["0x1"]`.
pub(crate) fn parse_chain_id(value: &serde_json::Value) -> Result<SignatureChainId, WalletError> {
    use serde_json::Value;
    match value {
        Value::String(s) => s.parse().map_err(WalletError::ChainQuery),
        Value::Number(n) => n
            .as_u64()
            .map(SignatureChainId)
            .ok_or_else(|| WalletError::ChainQuery(format!("invalid chain id {n}"))),
        Value::Array(items) if items.len() == 1 => parse_chain_id(&items[0]),
        other => Err(WalletError::ChainQuery(format!(
            "unexpected chain id response {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chain_id_shapes() {
        assert_eq!(parse_chain_id(&json!("0x1")).unwrap(), SignatureChainId(1));
        assert_eq!(parse_chain_id(&json!(["0x1"])).unwrap(), SignatureChainId(1));
        assert_eq!(parse_chain_id(&json!(42161)).unwrap(), SignatureChainId(0xa4b1));
        assert!(parse_chain_id(&json!(null)).is_err());
        assert!(parse_chain_id(&json!(["0x1", "0x2"])).is_err());
        assert!(parse_chain_id(&json!("mainnet")).is_err());
    }
}
