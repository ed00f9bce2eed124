//! WebSocket layer — messages, subscriptions, events.
//!
//! The transport itself lives in `native.rs` (`ws-native` feature,
//! `tokio-tungstenite`) and the listener-facing sub-client in `events.rs`.
//! This module defines the wire messages, the connection state and the
//! lifecycle events shared with them.

pub mod subscriptions;

#[cfg(feature = "ws-native")]
pub mod native;

#[cfg(all(feature = "ws-native", feature = "http"))]
pub mod events;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use subscriptions::{ListenerId, Subscription, SubscriptionRegistry};

#[cfg(feature = "ws-native")]
pub use native::WsTransport;

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MessageOut {
    Subscribe { subscription: Subscription },
    Unsubscribe { subscription: Subscription },
    Post { id: u64, request: PostRequest },
    Ping,
}

/// Body of a post: an info query or a signed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRequest {
    /// `"info"` or `"action"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

// ─── Inbound messages ────────────────────────────────────────────────────────

/// Raw inbound frame: `{channel, data}`, or a bare `{id, response}` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageIn {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub response: Option<Value>,
}

/// Outcome carried by a post reply.
#[derive(Debug, Clone, PartialEq)]
pub enum PostOutcome {
    /// `info` reply: the query's data.
    Info(Value),
    /// `action` reply: the exchange envelope.
    Action(Value),
    /// The venue could not process the post.
    Error(String),
}

/// An inbound frame, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Pong,
    SubscriptionAck(Value),
    PostReply { id: u64, outcome: PostOutcome },
    /// A post reply whose id parsed but whose body did not.
    MalformedReply { id: u64, detail: String },
    Error(String),
    Push { channel: String, data: Value },
}

impl MessageIn {
    pub fn parse(text: &str) -> Result<Kind, serde_json::Error> {
        let msg: MessageIn = serde_json::from_str(text)?;
        Ok(msg.classify())
    }

    fn classify(self) -> Kind {
        match self.channel.as_deref() {
            Some("pong") => Kind::Pong,
            Some("subscriptionResponse") => Kind::SubscriptionAck(self.data),
            Some("post") => match post_reply(&self.data) {
                Some((id, outcome)) => Kind::PostReply { id, outcome },
                None => match self.data.get("id").and_then(Value::as_u64) {
                    Some(id) => Kind::MalformedReply {
                        id,
                        detail: format!("malformed post reply: {}", self.data),
                    },
                    None => Kind::Error(format!("malformed post reply: {}", self.data)),
                },
            },
            Some("error") => Kind::Error(match self.data {
                Value::String(s) => s,
                other => other.to_string(),
            }),
            Some(channel) => Kind::Push {
                channel: channel.to_string(),
                data: self.data,
            },
            None => {
                let bare = serde_json::json!({"id": self.id, "response": self.response});
                match post_reply(&bare) {
                    Some((id, outcome)) => Kind::PostReply { id, outcome },
                    None => Kind::Error("frame carries neither channel nor id".into()),
                }
            }
        }
    }
}

fn post_reply(data: &Value) -> Option<(u64, PostOutcome)> {
    let id = data.get("id")?.as_u64()?;
    let response = data.get("response")?;
    let payload = response.get("payload").cloned().unwrap_or(Value::Null);
    let outcome = match response.get("type").and_then(Value::as_str) {
        Some("info") => PostOutcome::Info(match payload {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        }),
        Some("action") => PostOutcome::Action(payload),
        Some("error") => PostOutcome::Error(match payload {
            Value::String(s) => s,
            other => other.to_string(),
        }),
        _ => return None,
    };
    Some((id, outcome))
}

// ─── Connection state ────────────────────────────────────────────────────────

/// Connection state of the stream transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    /// No connection task running. The next subscribe or post starts one.
    Idle = 0,
    Connecting = 1,
    Open = 2,
    /// Waiting out the backoff before the next connection attempt.
    Reconnecting = 3,
    /// Closed by the caller. Terminal.
    Closed = 4,
}

impl From<u8> for ReadyState {
    fn from(value: u8) -> Self {
        match value {
            1 => ReadyState::Connecting,
            2 => ReadyState::Open,
            3 => ReadyState::Reconnecting,
            4 => ReadyState::Closed,
            _ => ReadyState::Idle,
        }
    }
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// Lifecycle events emitted by the stream transport.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    /// Connection established and subscriptions replayed.
    Connected,
    /// Connection lost (may trigger reconnect).
    Disconnected { code: Option<u16>, reason: String },
    /// A reconnect attempt is scheduled.
    Reconnecting { attempt: u32, delay_ms: u64 },
    /// A connection failure or a venue-side error frame.
    Error(String),
    /// Closed by the caller.
    Closed,
}

/// Configuration for the stream transport.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    pub reconnect: bool,
    /// Attempts before posts stop waiting for a connection. While any listener
    /// is registered the transport keeps retrying at the capped delay.
    pub max_reconnect_attempts: u32,
    pub base_reconnect_delay_ms: u32,
    pub max_reconnect_delay_ms: u32,
    pub ping_interval_ms: u32,
    pub pong_timeout_ms: u32,
    /// Default deadline for a post.
    pub post_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::MAINNET_WS_URL.to_string(),
            reconnect: true,
            max_reconnect_attempts: 10,
            base_reconnect_delay_ms: 500,
            max_reconnect_delay_ms: 30_000,
            ping_interval_ms: 30_000,
            pong_timeout_ms: 10_000,
            post_timeout_ms: 15_000,
        }
    }
}
