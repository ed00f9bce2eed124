//! Action signing.
//!
//! [`ActionSigner`] turns an action plus its signing context into an EIP-712
//! [`TypedPayload`] and asks the wallet to sign it. It never sees key material.
//!
//! Two payload families exist:
//! - L1 actions are hashed into a phantom `Agent` struct under the fixed
//!   `Exchange` domain (see [`l1`]).
//! - User-signed actions are signed as `HyperliquidTransaction:*` structs under
//!   the wallet's resolved signature chain id (see [`user`]).

pub mod l1;
pub mod typed_data;
pub mod user;

pub use typed_data::{Eip712Domain, TypedField, TypedPayload, TypedValue};

use crate::domain::action::Action;
use crate::error::{SdkError, WalletError};
use crate::network::{Network, SignatureChainId};
use crate::shared::{Address, RsvSignature};
use crate::wallet::ExchangeWallet;

/// Everything besides the action itself that the signature commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignContext {
    pub nonce: u64,
    pub chain_id: SignatureChainId,
    pub vault_address: Option<Address>,
    pub expires_after: Option<u64>,
}

impl SignContext {
    pub fn new(nonce: u64, chain_id: SignatureChainId) -> Self {
        Self {
            nonce,
            chain_id,
            vault_address: None,
            expires_after: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSigner {
    network: Network,
}

impl ActionSigner {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Build the typed payload for `action`.
    ///
    /// Identical `(action, ctx)` pairs always produce identical payloads.
    pub fn typed_payload(
        &self,
        action: &Action,
        ctx: &SignContext,
    ) -> Result<TypedPayload, SdkError> {
        if let Some(binding) = action.chain_binding() {
            if binding.signature_chain_id != ctx.chain_id {
                return Err(SdkError::Validation(format!(
                    "{} is bound to chain {}, signing under {}",
                    action.tag(),
                    binding.signature_chain_id,
                    ctx.chain_id
                )));
            }
            if binding.hyperliquid_chain != self.network.hyperliquid_chain() {
                return Err(SdkError::Validation(format!(
                    "{} is bound to {}, signer targets {}",
                    action.tag(),
                    binding.hyperliquid_chain,
                    self.network
                )));
            }
        }

        match user::user_signed_payload(action) {
            Some(payload) => Ok(payload),
            None => {
                let connection_id =
                    l1::action_hash(action, ctx.nonce, ctx.vault_address, ctx.expires_after)?;
                Ok(l1::agent_payload(connection_id, self.network))
            }
        }
    }

    /// Sign `action` with `wallet`.
    ///
    /// The returned signature is checked to recover to the wallet's address.
    pub async fn sign(
        &self,
        action: &Action,
        ctx: &SignContext,
        wallet: &dyn ExchangeWallet,
    ) -> Result<RsvSignature, SdkError> {
        let payload = self.typed_payload(action, ctx)?;
        let digest = payload.digest();

        let signature = wallet.sign_typed_data(&payload).await?;
        let recovered = signature
            .recover(digest)
            .map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
        if recovered != wallet.address() {
            return Err(WalletError::InvalidSignature(format!(
                "recovered {recovered:#x}, expected {:#x}",
                wallet.address()
            ))
            .into());
        }

        tracing::debug!(
            action = action.tag(),
            nonce = ctx.nonce,
            digest = %format!("{digest:#x}"),
            "signed action"
        );
        Ok(signature.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{BulkOrder, Grouping, OrderRequest, Tif};
    use crate::domain::transfer::UsdSend;
    use crate::wallet::LocalAccount;
    use ethers::types::Signature;

    const TEST_KEY: &str = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";

    fn order_action() -> Action {
        Action::Order(BulkOrder {
            orders: vec![OrderRequest::limit(4, true, "1100", "0.2", Tif::Gtc)],
            grouping: Grouping::Na,
            builder: None,
        })
    }

    #[tokio::test]
    async fn test_signing_is_deterministic_and_recoverable() {
        let wallet = LocalAccount::from_private_key(TEST_KEY).unwrap();
        let signer = ActionSigner::new(Network::Mainnet);
        let ctx = SignContext::new(17, Network::Mainnet.default_signature_chain_id());
        let action = order_action();

        let first = signer.sign(&action, &ctx, &wallet).await.unwrap();
        let second = signer.sign(&action, &ctx, &wallet).await.unwrap();
        assert_eq!(first, second);
        assert!(first.v == 27 || first.v == 28);

        let digest = signer.typed_payload(&action, &ctx).unwrap().digest();
        let recovered = Signature::from(first).recover(digest).unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_new_nonce_changes_signature() {
        let wallet = LocalAccount::from_private_key(TEST_KEY).unwrap();
        let signer = ActionSigner::new(Network::Testnet);
        let action = order_action();
        let chain = Network::Testnet.default_signature_chain_id();

        let a = signer.sign(&action, &SignContext::new(1, chain), &wallet).await.unwrap();
        let b = signer.sign(&action, &SignContext::new(2, chain), &wallet).await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_user_signed_binding_must_match_context() {
        let signer = ActionSigner::new(Network::Mainnet);
        let mut action = Action::UsdSend(UsdSend::new(Address::zero(), "1"));
        action.bind(5, Network::Mainnet, SignatureChainId(1));

        let ok = signer.typed_payload(&action, &SignContext::new(5, SignatureChainId(1)));
        assert!(ok.is_ok());

        let err = signer
            .typed_payload(&action, &SignContext::new(5, SignatureChainId(0xa4b1)))
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
    }

    #[test]
    fn test_l1_payload_ignores_signature_chain() {
        let signer = ActionSigner::new(Network::Mainnet);
        let action = order_action();
        let a = signer
            .typed_payload(&action, &SignContext::new(3, SignatureChainId(1)))
            .unwrap();
        let b = signer
            .typed_payload(&action, &SignContext::new(3, SignatureChainId(0xa4b1)))
            .unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.domain.chain_id, 1337);
    }
}
