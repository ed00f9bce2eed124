//! Subscription types, tracking, and matching.

use crate::shared::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Parameters of a stream subscription.
///
/// Wire format uses `#[serde(tag = "type")]`; the same shape is sent for both
/// subscribe and unsubscribe, discriminated by the outer `method` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Subscription {
    AllMids,
    Notification {
        user: Address,
    },
    WebData2 {
        user: Address,
    },
    Candle {
        coin: String,
        interval: String,
    },
    L2Book {
        coin: String,
        #[serde(rename = "nSigFigs", default, skip_serializing_if = "Option::is_none")]
        n_sig_figs: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mantissa: Option<u8>,
    },
    Trades {
        coin: String,
    },
    OrderUpdates {
        user: Address,
    },
    UserEvents {
        user: Address,
    },
    UserFills {
        user: Address,
        #[serde(rename = "aggregateByTime", default, skip_serializing_if = "Option::is_none")]
        aggregate_by_time: Option<bool>,
    },
    UserFundings {
        user: Address,
    },
    UserNonFundingLedgerUpdates {
        user: Address,
    },
    ActiveAssetCtx {
        coin: String,
    },
    ActiveAssetData {
        user: Address,
        coin: String,
    },
    UserTwapSliceFills {
        user: Address,
    },
    UserTwapHistory {
        user: Address,
    },
    Bbo {
        coin: String,
    },
}

impl Subscription {
    /// Normalized identity: the canonical JSON of the parameters.
    ///
    /// Addresses serialize lowercase, so differently-cased inputs share a key.
    pub fn subscription_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }

    /// Channel name the venue uses for this subscription's pushes.
    pub fn push_channel(&self) -> &'static str {
        match self {
            Subscription::AllMids => "allMids",
            Subscription::Notification { .. } => "notification",
            Subscription::WebData2 { .. } => "webData2",
            Subscription::Candle { .. } => "candle",
            Subscription::L2Book { .. } => "l2Book",
            Subscription::Trades { .. } => "trades",
            Subscription::OrderUpdates { .. } => "orderUpdates",
            Subscription::UserEvents { .. } => "user",
            Subscription::UserFills { .. } => "userFills",
            Subscription::UserFundings { .. } => "userFundings",
            Subscription::UserNonFundingLedgerUpdates { .. } => "userNonFundingLedgerUpdates",
            Subscription::ActiveAssetCtx { .. } => "activeAssetCtx",
            Subscription::ActiveAssetData { .. } => "activeAssetData",
            Subscription::UserTwapSliceFills { .. } => "userTwapSliceFills",
            Subscription::UserTwapHistory { .. } => "userTwapHistory",
            Subscription::Bbo { .. } => "bbo",
        }
    }

    fn accepts_channel(&self, channel: &str) -> bool {
        channel == self.push_channel()
            || (matches!(self, Subscription::ActiveAssetCtx { .. })
                && channel == "activeSpotAssetCtx")
    }

    /// Fields of a push payload that identify which subscription it belongs to.
    fn identifiers(&self) -> Vec<(&'static str, Identifier<'_>)> {
        match self {
            Subscription::AllMids
            | Subscription::Notification { .. }
            | Subscription::OrderUpdates { .. }
            | Subscription::UserEvents { .. } => Vec::new(),
            Subscription::Candle { coin, interval } => vec![
                ("s", Identifier::Text(coin)),
                ("i", Identifier::Text(interval)),
            ],
            Subscription::L2Book { coin, .. }
            | Subscription::Trades { coin }
            | Subscription::ActiveAssetCtx { coin }
            | Subscription::Bbo { coin } => vec![("coin", Identifier::Text(coin))],
            Subscription::ActiveAssetData { user, coin } => vec![
                ("user", Identifier::Address(*user)),
                ("coin", Identifier::Text(coin)),
            ],
            Subscription::WebData2 { user }
            | Subscription::UserFills { user, .. }
            | Subscription::UserFundings { user }
            | Subscription::UserNonFundingLedgerUpdates { user }
            | Subscription::UserTwapSliceFills { user }
            | Subscription::UserTwapHistory { user } => {
                vec![("user", Identifier::Address(*user))]
            }
        }
    }

    /// Whether a push on `channel` with `data` belongs to this subscription.
    ///
    /// An identifying field that is present must match; one that is absent
    /// matches everything, so identifier-less channels fan out to every
    /// subscription of their kind. Array payloads are identified by their
    /// first element.
    pub fn matches_push(&self, channel: &str, data: &Value) -> bool {
        if !self.accepts_channel(channel) {
            return false;
        }
        let source = match data {
            Value::Array(items) => items.first().unwrap_or(&Value::Null),
            other => other,
        };
        self.identifiers()
            .into_iter()
            .all(|(field, expected)| match source.get(field).and_then(Value::as_str) {
                Some(actual) => expected.matches(actual),
                None => true,
            })
    }
}

enum Identifier<'a> {
    Text(&'a str),
    Address(Address),
}

impl Identifier<'_> {
    fn matches(&self, actual: &str) -> bool {
        match self {
            Identifier::Text(expected) => *expected == actual,
            Identifier::Address(expected) => {
                format!("{expected:#x}").eq_ignore_ascii_case(actual)
            }
        }
    }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Identifies one listener. Stable across reconnects.
pub type ListenerId = u64;

type Listener = (ListenerId, mpsc::UnboundedSender<Arc<Value>>);

#[derive(Debug)]
struct Entry {
    key: String,
    subscription: Subscription,
    listeners: Vec<Listener>,
}

/// Subscriptions with at least one listener, in first-registration order.
///
/// Identical subscriptions share one entry. The caller sends the wire
/// subscribe only when [`add`](Self::add) reports a new entry, and the wire
/// unsubscribe only when [`remove`](Self::remove) returns the subscription.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Vec<Entry>,
    next_listener: ListenerId,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns its id and whether the subscription is new.
    pub fn add(
        &mut self,
        subscription: Subscription,
        sender: mpsc::UnboundedSender<Arc<Value>>,
    ) -> (ListenerId, bool) {
        self.next_listener += 1;
        let id = self.next_listener;
        let key = subscription.subscription_key();

        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.listeners.push((id, sender));
            return (id, false);
        }

        tracing::debug!("Tracking subscription: {}", key);
        self.entries.push(Entry {
            key,
            subscription,
            listeners: vec![(id, sender)],
        });
        (id, true)
    }

    /// Remove a listener. Returns the subscription when it was the last one.
    pub fn remove(&mut self, id: ListenerId) -> Option<Subscription> {
        let index = self
            .entries
            .iter()
            .position(|e| e.listeners.iter().any(|(lid, _)| *lid == id))?;
        let entry = &mut self.entries[index];
        entry.listeners.retain(|(lid, _)| *lid != id);
        if !entry.listeners.is_empty() {
            return None;
        }
        let entry = self.entries.remove(index);
        tracing::debug!("Removed subscription from tracking: {}", entry.key);
        Some(entry.subscription)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Active subscriptions, in first-registration order.
    pub fn active(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter().map(|e| &e.subscription)
    }

    /// Deliver a push to every matching listener, in registration order.
    ///
    /// A listener whose receiver is gone is skipped. Returns the number of
    /// listeners the payload was handed to.
    pub fn dispatch(&self, channel: &str, data: Arc<Value>) -> usize {
        let mut delivered = 0;
        for entry in &self.entries {
            if !entry.subscription.matches_push(channel, &data) {
                continue;
            }
            for (_, sender) in &entry.listeners {
                if sender.send(Arc::clone(&data)).is_ok() {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.entries.iter().map(|e| e.listeners.len()).sum()
    }

    /// Drop every subscription and listener.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> Address {
        "0x5ac99df645f3414876c816caa18b2d234024b487".parse().unwrap()
    }

    #[test]
    fn test_subscription_wire_shape() {
        let sub = Subscription::L2Book {
            coin: "ETH".into(),
            n_sig_figs: Some(5),
            mantissa: None,
        };
        assert_eq!(
            serde_json::to_value(&sub).unwrap(),
            json!({"type": "l2Book", "coin": "ETH", "nSigFigs": 5})
        );
        assert_eq!(
            serde_json::to_value(Subscription::UserEvents { user: user() }).unwrap(),
            json!({"type": "userEvents", "user": "0x5ac99df645f3414876c816caa18b2d234024b487"})
        );
    }

    #[test]
    fn test_key_normalizes_address_case() {
        let lower = Subscription::UserFills {
            user: user(),
            aggregate_by_time: None,
        };
        let mixed = Subscription::UserFills {
            user: "0x5AC99DF645F3414876C816CAA18B2D234024B487".parse().unwrap(),
            aggregate_by_time: None,
        };
        assert_eq!(lower.subscription_key(), mixed.subscription_key());
    }

    #[test]
    fn test_matches_push_by_identifier() {
        let btc = Subscription::Trades { coin: "BTC".into() };
        assert!(btc.matches_push("trades", &json!([{"coin": "BTC", "px": "1"}])));
        assert!(!btc.matches_push("trades", &json!([{"coin": "ETH"}])));
        assert!(!btc.matches_push("l2Book", &json!({"coin": "BTC"})));

        let candle = Subscription::Candle {
            coin: "ETH".into(),
            interval: "1m".into(),
        };
        assert!(candle.matches_push("candle", &json!({"s": "ETH", "i": "1m"})));
        assert!(!candle.matches_push("candle", &json!({"s": "ETH", "i": "5m"})));

        let fills = Subscription::UserFills {
            user: user(),
            aggregate_by_time: None,
        };
        assert!(fills.matches_push(
            "userFills",
            &json!({"user": "0x5AC99DF645F3414876C816CAA18B2D234024B487", "fills": []})
        ));
        assert!(!fills.matches_push(
            "userFills",
            &json!({"user": "0x0000000000000000000000000000000000000001", "fills": []})
        ));
    }

    #[test]
    fn test_identifierless_channels_fan_out() {
        let events = Subscription::UserEvents { user: user() };
        assert!(events.matches_push("user", &json!({"fills": []})));
        let orders = Subscription::OrderUpdates { user: user() };
        assert!(orders.matches_push("orderUpdates", &json!([{"status": "open"}])));
        assert!(Subscription::AllMids.matches_push("allMids", &json!({"mids": {}})));
    }

    #[test]
    fn test_active_asset_ctx_accepts_spot_channel() {
        let ctx = Subscription::ActiveAssetCtx { coin: "@1".into() };
        assert!(ctx.matches_push("activeSpotAssetCtx", &json!({"coin": "@1"})));
    }

    #[test]
    fn test_registry_dedups_and_tracks_last_listener() {
        let mut registry = SubscriptionRegistry::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let (a, first) = registry.add(Subscription::AllMids, tx1);
        let (b, second) = registry.add(Subscription::AllMids, tx2);
        assert!(first);
        assert!(!second);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.listener_count(), 2);

        assert_eq!(registry.remove(a), None);
        assert_eq!(registry.remove(b), Some(Subscription::AllMids));
        assert!(registry.is_empty());
        assert_eq!(registry.remove(b), None);
    }

    #[test]
    fn test_registry_preserves_registration_order() {
        let mut registry = SubscriptionRegistry::new();
        let subs = vec![
            Subscription::Trades { coin: "BTC".into() },
            Subscription::AllMids,
            Subscription::Bbo { coin: "ETH".into() },
        ];
        for sub in &subs {
            let (tx, _rx) = mpsc::unbounded_channel();
            registry.add(sub.clone(), tx);
        }
        let active: Vec<_> = registry.active().cloned().collect();
        assert_eq!(active, subs);
    }

    #[tokio::test]
    async fn test_dispatch_reaches_every_listener_in_order() {
        let mut registry = SubscriptionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();
        registry.add(Subscription::AllMids, tx1);
        registry.add(Subscription::AllMids, tx2);
        registry.add(Subscription::AllMids, tx3);

        // A listener that went away does not block the others.
        drop(rx2);

        let delivered = registry.dispatch("allMids", Arc::new(json!({"mids": {"BTC": "1"}})));
        assert_eq!(delivered, 2);
        assert_eq!(rx1.recv().await.unwrap()["mids"]["BTC"], "1");
        assert_eq!(rx3.recv().await.unwrap()["mids"]["BTC"], "1");

        assert_eq!(registry.dispatch("trades", Arc::new(json!([]))), 0);
    }
}
