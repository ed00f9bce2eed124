use super::{ChainIdResolver, ExchangeWallet, NonceCounter};
use crate::error::WalletError;
use crate::network::{Network, SignatureChainId};
use crate::shared::Address;
use async_lock::OnceCell;
use std::sync::Arc;

/// A wallet bound to a network, with its own nonce counter and chain id cache.
///
/// Passed explicitly to every exchange call. Clone it freely: clones share the
/// counter and the cache.
#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    wallet: Arc<dyn ExchangeWallet>,
    network: Network,
    resolver: ChainIdResolver,
    chain_id: OnceCell<SignatureChainId>,
    nonces: NonceCounter,
}

impl WalletSession {
    pub fn new(wallet: impl ExchangeWallet + 'static, network: Network) -> Self {
        Self::from_parts(
            Arc::new(wallet),
            network,
            ChainIdResolver::for_network(network),
            NonceCounter::new(),
        )
    }

    pub fn from_parts(
        wallet: Arc<dyn ExchangeWallet>,
        network: Network,
        resolver: ChainIdResolver,
        nonces: NonceCounter,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                wallet,
                network,
                resolver,
                chain_id: OnceCell::new(),
                nonces,
            }),
        }
    }

    pub fn address(&self) -> Address {
        self.inner.wallet.address()
    }

    pub fn network(&self) -> Network {
        self.inner.network
    }

    pub fn wallet(&self) -> &dyn ExchangeWallet {
        self.inner.wallet.as_ref()
    }

    pub fn next_nonce(&self) -> u64 {
        self.inner.nonces.next()
    }

    /// Resolved once for the lifetime of the session. Concurrent first calls
    /// wait on the same resolution. A failed resolution is not cached.
    pub async fn chain_id(&self) -> Result<SignatureChainId, WalletError> {
        let inner = &self.inner;
        inner
            .chain_id
            .get_or_try_init(|| async { inner.resolver.resolve(inner.wallet.as_ref()).await })
            .await
            .copied()
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.address())
            .field("network", &self.inner.network)
            .field("chain_id", &self.inner.chain_id.get())
            .field("nonces", &self.inner.nonces)
            .finish()
    }
}
