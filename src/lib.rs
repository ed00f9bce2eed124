//! # Hyperliquid SDK
//!
//! A Rust SDK for the Hyperliquid API: action signing, an HTTP transport and a
//! multiplexed WebSocket transport.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, network constants, domain wire types
//! 2. **Wallet** — `ExchangeWallet` adapters, chain id resolution, nonces, `WalletSession`
//! 3. **Signing** — EIP-712 typed data, L1 phantom-agent hashing, user-signed actions
//! 4. **Transport** — `HttpTransport` with linear retry, `WsTransport` over `tokio-tungstenite`
//! 5. **High-Level Client** — `HyperliquidClient` with `info()`, `exchange()` and `events()`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hyperliquid_sdk::prelude::*;
//!
//! let client = HyperliquidClient::new(Network::Testnet)?;
//! let session = WalletSession::new(LocalAccount::from_private_key(KEY)?, Network::Testnet);
//!
//! let statuses = client
//!     .exchange()
//!     .order(
//!         &session,
//!         vec![OrderRequest::limit(0, true, "30000", "0.01", Tif::Gtc)],
//!         Grouping::Na,
//!         &SubmitOptions::default(),
//!     )
//!     .await?;
//!
//! let _handle = client.events().trades("BTC", |trades| println!("{trades}"))?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): action payloads, envelopes, query shapes.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants and chain identifiers.
pub mod network;

// ── Layer 2: Wallet ──────────────────────────────────────────────────────────

/// Wallet adapters, chain id resolution and nonce allocation.
pub mod wallet;

// ── Layer 3: Signing ─────────────────────────────────────────────────────────

/// EIP-712 payload construction and action signing.
pub mod signing;

// ── Layer 4: Transport ───────────────────────────────────────────────────────

/// The request seam shared by both transports.
pub mod transport;

/// HTTP transport with retry policies.
#[cfg(feature = "http")]
pub mod http;

/// WebSocket layer: messages, subscriptions, events.
pub mod ws;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `HyperliquidClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Address, Cloid, RsvSignature};

    // Network
    pub use crate::network::{Network, SignatureChainId};

    // Domain types — actions and envelopes
    pub use crate::domain::action::Action;
    pub use crate::domain::exchange::{ExchangeRequest, ExchangeResponse};
    pub use crate::domain::info::{InfoRequest, OrderRef};
    pub use crate::domain::order::{
        CancelByCloidRequest, CancelRequest, Grouping, ModifyRequest, OrderRequest, OrderStatus,
        Tif, Tpsl,
    };
    pub use crate::domain::twap::{TwapRequest, TwapStatus};

    // Domain types — staking
    pub use crate::domain::staking::{
        Delegation, DelegatorReward, DelegatorSummary, DelegatorUpdate, ValidatorSummary,
    };

    // Errors
    pub use crate::error::{ApiRequestError, SdkError, WalletError, WsError};

    // Wallets
    pub use crate::wallet::{
        ChainIdResolver, Eip1193Provider, ExchangeWallet, InjectedWallet, LocalAccount,
        NonceCounter, ProviderWallet, WalletSession,
    };

    // Signing
    pub use crate::signing::{ActionSigner, SignContext, TypedPayload};

    // Transport
    pub use crate::transport::{Endpoint, Transport};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        ExchangeClient, HyperliquidClient, HyperliquidClientBuilder, InfoClient, SubmitOptions,
        TransportKind,
    };
    #[cfg(feature = "http")]
    pub use crate::http::{HttpConfig, HttpTransport, RetryConfig, RetryPolicy};

    // WebSocket types
    pub use crate::ws::{ReadyState, Subscription, WsConfig, WsEvent};
    #[cfg(feature = "ws-native")]
    pub use crate::ws::WsTransport;
    #[cfg(all(feature = "ws-native", feature = "http"))]
    pub use crate::client::{EventClient, SubscriptionHandle};
}
