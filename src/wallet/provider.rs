use super::ExchangeWallet;
use crate::error::WalletError;
use crate::network::SignatureChainId;
use crate::shared::Address;
use crate::signing::TypedPayload;
use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Signature;
use std::sync::Arc;

/// A local key paired with an ethers provider that reports the active chain.
#[derive(Debug)]
pub struct ProviderWallet<M> {
    signer: LocalWallet,
    provider: Arc<M>,
}

impl<M: Middleware> ProviderWallet<M> {
    pub fn new(signer: LocalWallet, provider: Arc<M>) -> Self {
        Self { signer, provider }
    }

    pub fn provider(&self) -> &Arc<M> {
        &self.provider
    }
}

#[async_trait]
impl<M> ExchangeWallet for ProviderWallet<M>
where
    M: Middleware + 'static,
{
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn query_chain_id(&self) -> Result<Option<SignatureChainId>, WalletError> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| WalletError::ChainQuery(e.to_string()))?;
        if chain_id.bits() > 64 {
            return Err(WalletError::ChainQuery(format!(
                "chain id {chain_id} does not fit in u64"
            )));
        }
        Ok(Some(SignatureChainId(chain_id.as_u64())))
    }

    async fn sign_typed_data(&self, payload: &TypedPayload) -> Result<Signature, WalletError> {
        self.signer
            .sign_hash(payload.digest())
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}
