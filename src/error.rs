//! Unified SDK error types.

use std::time::Duration;

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("WebSocket error: {0}")]
    Ws(#[from] WsError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// The venue rejected the request. Never retried automatically.
    #[error(transparent)]
    Api(#[from] ApiRequestError),

    /// A caller-specified deadline elapsed. The remote side may still act on the request.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Action encoding error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// The venue's message, if this is an [`ApiRequestError`].
    pub fn api_message(&self) -> Option<&str> {
        match self {
            SdkError::Api(e) => Some(&e.message),
            _ => None,
        }
    }

    /// Whether a post was abandoned because the stream connection dropped.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, SdkError::Ws(WsError::ConnectionLost))
    }
}

/// A venue-side rejection. `message` is the venue's text, verbatim.
///
/// Callers that branch on known conditions (for example
/// `"Initial deposit in vault is less than $100"`) compare `message` exactly.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiRequestError {
    pub message: String,
    /// The raw `response` body that accompanied the rejection, if any.
    pub response: Option<serde_json::Value>,
}

impl ApiRequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    /// Transient transport failure (connection refused, reset, …).
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Bad request {status}: {body}")]
    BadRequest { status: u16, body: String },

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// WebSocket errors.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The socket dropped while a request was in flight. The request is not resent.
    #[error("Connection lost")]
    ConnectionLost,

    /// The transport was closed by the caller; no further reconnection happens.
    #[error("Transport closed")]
    Closed,

    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

/// Wallet integration errors.
#[derive(Error, Debug)]
pub enum WalletError {
    /// The wallet exposes no chain capability and no default applies.
    #[error("Unsupported wallet kind: cannot determine signature chain id")]
    UnsupportedWalletKind,

    #[error("Chain id query failed: {0}")]
    ChainQuery(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_message_verbatim() {
        let err: SdkError = ApiRequestError::new("Initial deposit in vault is less than $100").into();
        assert_eq!(err.to_string(), "Initial deposit in vault is less than $100");
        assert_eq!(
            err.api_message(),
            Some("Initial deposit in vault is less than $100")
        );
    }

    #[test]
    fn test_connection_lost_predicate() {
        let err: SdkError = WsError::ConnectionLost.into();
        assert!(err.is_connection_lost());
        assert!(err.api_message().is_none());

        let other: SdkError = WsError::Closed.into();
        assert!(!other.is_connection_lost());
    }
}
