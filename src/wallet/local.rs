use super::ExchangeWallet;
use crate::error::WalletError;
use crate::network::SignatureChainId;
use crate::shared::Address;
use crate::signing::TypedPayload;
use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Signature;

/// A private key held in process.
#[derive(Debug, Clone)]
pub struct LocalAccount {
    wallet: LocalWallet,
    chain_id: Option<SignatureChainId>,
}

impl LocalAccount {
    pub fn new(wallet: LocalWallet) -> Self {
        Self {
            wallet,
            chain_id: None,
        }
    }

    /// Parse a hex private key, with or without `0x`.
    pub fn from_private_key(key: &str) -> Result<Self, WalletError> {
        let wallet = key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| WalletError::Signing(format!("invalid private key: {e}")))?;
        Ok(Self::new(wallet))
    }

    /// Pin the signature chain id, skipping any query or default.
    pub fn with_chain_id(mut self, chain_id: impl Into<SignatureChainId>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }
}

#[async_trait]
impl ExchangeWallet for LocalAccount {
    fn address(&self) -> Address {
        self.wallet.address()
    }

    fn static_chain_id(&self) -> Option<SignatureChainId> {
        self.chain_id
    }

    async fn sign_typed_data(&self, payload: &TypedPayload) -> Result<Signature, WalletError> {
        self.wallet
            .sign_hash(payload.digest())
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}
