use super::{parse_chain_id, ExchangeWallet};
use crate::error::WalletError;
use crate::network::SignatureChainId;
use crate::shared::Address;
use crate::signing::TypedPayload;
use async_trait::async_trait;
use ethers::types::Signature;
use serde_json::{json, Value};
use std::str::FromStr;

/// The generic `request({method, params})` surface of an EIP-1193 provider,
/// such as a browser extension bridged into the process.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;
}

/// A wallet reached only through an EIP-1193 provider.
#[derive(Debug, Clone)]
pub struct InjectedWallet<P> {
    provider: P,
    address: Address,
}

impl<P: Eip1193Provider> InjectedWallet<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self { provider, address }
    }

    /// Use the provider's first account.
    pub async fn connect(provider: P) -> Result<Self, WalletError> {
        let accounts = provider.request("eth_accounts", json!([])).await?;
        let first = accounts
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .ok_or_else(|| WalletError::Signing("provider exposes no accounts".into()))?;
        let address = Address::from_str(first)
            .map_err(|e| WalletError::Signing(format!("invalid account {first:?}: {e}")))?;
        Ok(Self::new(provider, address))
    }
}

#[async_trait]
impl<P: Eip1193Provider> ExchangeWallet for InjectedWallet<P> {
    fn address(&self) -> Address {
        self.address
    }

    async fn query_chain_id(&self) -> Result<Option<SignatureChainId>, WalletError> {
        let response = self.provider.request("eth_chainId", json!([])).await?;
        parse_chain_id(&response).map(Some)
    }

    async fn sign_typed_data(&self, payload: &TypedPayload) -> Result<Signature, WalletError> {
        let typed = serde_json::to_string(&payload.to_json())
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        let response = self
            .provider
            .request(
                "eth_signTypedData_v4",
                json!([format!("{:#x}", self.address), typed]),
            )
            .await?;
        let raw = response.as_str().ok_or_else(|| {
            WalletError::InvalidSignature(format!("expected hex string, got {response}"))
        })?;

        let mut signature =
            Signature::from_str(raw).map_err(|e| WalletError::InvalidSignature(e.to_string()))?;
        // Some providers return a recovery id of 0/1.
        if signature.v < 27 {
            signature.v += 27;
        }
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{ActionSigner, SignContext};
    use crate::domain::action::Action;
    use crate::domain::vault::CreateVault;
    use crate::network::Network;
    use ethers::signers::{LocalWallet, Signer};
    use std::sync::Mutex;

    /// Answers like a browser wallet, signing with a local key and reporting
    /// the chain id as a single-element array.
    struct FakeProvider {
        key: LocalWallet,
        calls: Mutex<Vec<String>>,
        zero_based_v: bool,
    }

    #[async_trait]
    impl Eip1193Provider for FakeProvider {
        async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
            self.calls.lock().unwrap().push(method.to_string());
            match method {
                "eth_accounts" => Ok(json!([format!("{:#x}", self.key.address())])),
                "eth_chainId" => Ok(json!(["0x1"])),
                "eth_signTypedData_v4" => {
                    let typed: Value = serde_json::from_str(params[1].as_str().unwrap()).unwrap();
                    assert_eq!(typed["primaryType"], "Agent");
                    // Rebuild the digest the same way a browser wallet would.
                    let payload = ActionSigner::new(Network::Mainnet)
                        .typed_payload(
                            &Action::CreateVault(CreateVault::new("v", "d", 1)),
                            &SignContext::new(1, Network::Mainnet.default_signature_chain_id()),
                        )
                        .unwrap();
                    let mut sig = self.key.sign_hash(payload.digest()).unwrap();
                    if self.zero_based_v {
                        sig.v -= 27;
                    }
                    Ok(Value::String(format!("0x{}", sig)))
                }
                other => Err(WalletError::Signing(format!("unsupported {other}"))),
            }
        }
    }

    fn fake(zero_based_v: bool) -> FakeProvider {
        FakeProvider {
            key: "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e"
                .parse()
                .unwrap(),
            calls: Mutex::new(Vec::new()),
            zero_based_v,
        }
    }

    #[tokio::test]
    async fn test_injected_chain_id_unwraps_array() {
        let wallet = InjectedWallet::connect(fake(false)).await.unwrap();
        assert_eq!(wallet.query_chain_id().await.unwrap(), Some(SignatureChainId(1)));
        assert_eq!(wallet.static_chain_id(), None);
    }

    #[tokio::test]
    async fn test_injected_signature_normalizes_v() {
        let wallet = InjectedWallet::connect(fake(true)).await.unwrap();
        let action = Action::CreateVault(CreateVault::new("v", "d", 1));
        let ctx = SignContext::new(1, Network::Mainnet.default_signature_chain_id());

        let rsv = ActionSigner::new(Network::Mainnet)
            .sign(&action, &ctx, &wallet)
            .await
            .unwrap();
        assert!(rsv.v == 27 || rsv.v == 28);
    }
}
