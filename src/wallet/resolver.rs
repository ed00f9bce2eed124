use super::ExchangeWallet;
use crate::error::WalletError;
use crate::network::{Network, SignatureChainId};
use tracing::debug;

/// Determines the chain id placed in the user-signed EIP-712 domain.
///
/// Resolution order is fixed: the wallet's static chain id, then one chain
/// query, then the configured default. Nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainIdResolver {
    default: Option<SignatureChainId>,
}

impl ChainIdResolver {
    /// Resolver with no fallback: wallets without a chain capability fail.
    pub fn new() -> Self {
        Self { default: None }
    }

    /// Fall back to the venue default for `network`.
    pub fn for_network(network: Network) -> Self {
        Self {
            default: Some(network.default_signature_chain_id()),
        }
    }

    pub fn with_default(mut self, default: impl Into<SignatureChainId>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn default_chain_id(&self) -> Option<SignatureChainId> {
        self.default
    }

    pub async fn resolve(
        &self,
        wallet: &dyn ExchangeWallet,
    ) -> Result<SignatureChainId, WalletError> {
        if let Some(chain_id) = wallet.static_chain_id() {
            debug!(%chain_id, "chain id from wallet");
            return Ok(chain_id);
        }
        if let Some(chain_id) = wallet.query_chain_id().await? {
            debug!(%chain_id, "chain id from provider query");
            return Ok(chain_id);
        }
        match self.default {
            Some(chain_id) => {
                debug!(%chain_id, "chain id from network default");
                Ok(chain_id)
            }
            None => Err(WalletError::UnsupportedWalletKind),
        }
    }
}
