//! High-level client — `HyperliquidClient` with nested sub-client accessors.
//!
//! Each sub-client lives next to the types it speaks:
//! `domain/info/client.rs`, `domain/exchange/client.rs` and `ws/events.rs`.
//! This module keeps the builder, the transports and request routing.

use crate::domain::exchange::client::Exchange;
use crate::domain::info::client::Info;
use crate::error::SdkError;
use crate::http::{HttpConfig, HttpTransport};
use crate::network::Network;
use crate::signing::ActionSigner;
use crate::transport::{Endpoint, Transport};
use crate::ws::WsConfig;

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::exchange::client::{Exchange as ExchangeClient, SubmitOptions};
pub use crate::domain::info::client::Info as InfoClient;
#[cfg(feature = "ws-native")]
pub use crate::ws::events::{Events as EventClient, SubscriptionHandle};

/// Which wire a request travels over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// One POST per request, with the configured retry policy.
    #[default]
    Http,
    /// A correlated post over the shared WebSocket connection. Never retried.
    Stream,
}

/// The primary entry point for the SDK.
///
/// Provides nested sub-client accessors: `client.info()`, `client.exchange()`,
/// `client.events()`. Wallets are not held here; pass a
/// [`WalletSession`](crate::wallet::WalletSession) to each exchange call.
#[derive(Clone)]
pub struct HyperliquidClient {
    pub(crate) network: Network,
    pub(crate) signer: ActionSigner,
    pub(crate) http: Arc<HttpTransport>,
    #[cfg(feature = "ws-native")]
    pub(crate) ws: Arc<crate::ws::WsTransport>,
    pub(crate) ws_config: WsConfig,
    pub(crate) default_transport: TransportKind,
}

impl HyperliquidClient {
    pub fn builder() -> HyperliquidClientBuilder {
        HyperliquidClientBuilder::default()
    }

    /// Client for `network` with default settings.
    pub fn new(network: Network) -> Result<Self, SdkError> {
        Self::builder().network(network).build()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn info(&self) -> Info<'_> {
        Info { client: self }
    }

    pub fn exchange(&self) -> Exchange<'_> {
        Exchange { client: self }
    }

    #[cfg(feature = "ws-native")]
    pub fn events(&self) -> crate::ws::events::Events<'_> {
        crate::ws::events::Events { client: self }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn signer(&self) -> &ActionSigner {
        &self.signer
    }

    pub fn http(&self) -> &HttpTransport {
        &self.http
    }

    /// The shared stream transport. It connects on first use.
    #[cfg(feature = "ws-native")]
    pub fn ws(&self) -> &Arc<crate::ws::WsTransport> {
        &self.ws
    }

    pub fn ws_config(&self) -> &WsConfig {
        &self.ws_config
    }

    pub fn default_transport(&self) -> TransportKind {
        self.default_transport
    }

    /// Send one request over `via`, or over the client default.
    pub(crate) async fn request(
        &self,
        endpoint: Endpoint,
        payload: Value,
        timeout: Option<Duration>,
        via: Option<TransportKind>,
    ) -> Result<Value, SdkError> {
        match via.unwrap_or(self.default_transport) {
            TransportKind::Http => self.http.request(endpoint, payload, timeout).await,
            #[cfg(feature = "ws-native")]
            TransportKind::Stream => self.ws.request(endpoint, payload, timeout).await,
            #[cfg(not(feature = "ws-native"))]
            TransportKind::Stream => Err(SdkError::Validation(
                "stream transport requires the `ws-native` feature".into(),
            )),
        }
    }
}

impl std::fmt::Debug for HyperliquidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperliquidClient")
            .field("network", &self.network)
            .field("base_url", &self.http.base_url())
            .field("ws_url", &self.ws_config.url)
            .field("default_transport", &self.default_transport)
            .finish()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct HyperliquidClientBuilder {
    network: Network,
    base_url: Option<String>,
    ws_url: Option<String>,
    use_websocket: bool,
    http_config: HttpConfig,
    ws_config: Option<WsConfig>,
}

impl HyperliquidClientBuilder {
    /// Target network. Also picks the default URLs and signing parameters.
    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn ws_url(mut self, url: &str) -> Self {
        self.ws_url = Some(url.to_string());
        self
    }

    /// Route info queries and exchange requests over the stream by default.
    pub fn use_websocket(mut self, enabled: bool) -> Self {
        self.use_websocket = enabled;
        self
    }

    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Stream settings. A `ws_url` set on the builder takes precedence over `config.url`.
    pub fn ws_config(mut self, config: WsConfig) -> Self {
        self.ws_config = Some(config);
        self
    }

    pub fn build(self) -> Result<HyperliquidClient, SdkError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| self.network.api_url().to_string());
        let http = HttpTransport::with_config(&base_url, self.http_config)?;

        let mut ws_config = self.ws_config.unwrap_or_else(|| WsConfig {
            url: self.network.ws_url().to_string(),
            ..WsConfig::default()
        });
        if let Some(url) = self.ws_url {
            ws_config.url = url;
        }

        let default_transport = if self.use_websocket {
            TransportKind::Stream
        } else {
            TransportKind::Http
        };

        Ok(HyperliquidClient {
            network: self.network,
            signer: ActionSigner::new(self.network),
            http: Arc::new(http),
            #[cfg(feature = "ws-native")]
            ws: Arc::new(crate::ws::WsTransport::new(ws_config.clone())),
            ws_config,
            default_transport,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_follow_network() {
        let client = HyperliquidClient::new(Network::Testnet).unwrap();
        assert_eq!(client.network(), Network::Testnet);
        assert_eq!(client.http().base_url(), crate::network::TESTNET_API_URL);
        assert_eq!(client.ws_config().url, crate::network::TESTNET_WS_URL);
        assert_eq!(client.signer().network(), Network::Testnet);
        assert_eq!(client.default_transport(), TransportKind::Http);
    }

    #[test]
    fn test_builder_overrides() {
        let client = HyperliquidClient::builder()
            .base_url("http://127.0.0.1:3001/")
            .ws_url("ws://127.0.0.1:3002/ws")
            .ws_config(WsConfig {
                url: "ws://ignored".into(),
                max_reconnect_attempts: 2,
                ..WsConfig::default()
            })
            .use_websocket(true)
            .build()
            .unwrap();
        assert_eq!(client.network(), Network::Mainnet);
        assert_eq!(client.http().base_url(), "http://127.0.0.1:3001");
        assert_eq!(client.ws_config().url, "ws://127.0.0.1:3002/ws");
        assert_eq!(client.ws_config().max_reconnect_attempts, 2);
        assert_eq!(client.default_transport(), TransportKind::Stream);
    }
}
