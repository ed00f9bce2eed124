//! Event sub-client — subscribe listeners to push channels.
//!
//! Identical subscriptions share one wire subscription; see
//! [`SubscriptionRegistry`](crate::ws::SubscriptionRegistry). Each listener runs
//! on its own task fed by its own channel, so a slow or panicking listener
//! never holds up delivery to the others.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::client::HyperliquidClient;
use crate::error::SdkError;
use crate::shared::Address;
use crate::ws::native::WsTransport;
use crate::ws::subscriptions::{ListenerId, Subscription};
use crate::ws::{ReadyState, WsEvent};

pub struct Events<'a> {
    pub(crate) client: &'a HyperliquidClient,
}

impl<'a> Events<'a> {
    /// Register `listener` for `subscription`, decoding each push as `T`.
    ///
    /// Pushes that fail to decode are logged and skipped.
    pub fn subscribe<T, F>(
        &self,
        subscription: Subscription,
        mut listener: F,
    ) -> Result<SubscriptionHandle, SdkError>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let transport = Arc::clone(&self.client.ws);
        let (id, mut rx) = transport.add_listener(subscription.clone())?;
        let channel = subscription.push_channel();

        let task = tokio::spawn(async move {
            while let Some(data) = rx.recv().await {
                match T::deserialize(&*data) {
                    Ok(event) => listener(event),
                    Err(e) => {
                        tracing::warn!(channel, listener = id, "Failed to decode push: {}", e);
                    }
                }
            }
        });

        tracing::debug!(listener = id, channel, "Listener registered");
        Ok(SubscriptionHandle {
            id,
            subscription,
            transport,
            task: Some(task),
        })
    }

    /// Register `listener` for `subscription` with the raw push data.
    pub fn subscribe_raw<F>(
        &self,
        subscription: Subscription,
        listener: F,
    ) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe::<Value, F>(subscription, listener)
    }

    // ── Market channels ──────────────────────────────────────────────────

    pub fn all_mids<F>(&self, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe_raw(Subscription::AllMids, listener)
    }

    pub fn l2_book<F>(&self, coin: &str, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        let subscription = Subscription::L2Book {
            coin: coin.to_string(),
            n_sig_figs: None,
            mantissa: None,
        };
        self.subscribe_raw(subscription, listener)
    }

    pub fn trades<F>(&self, coin: &str, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe_raw(
            Subscription::Trades {
                coin: coin.to_string(),
            },
            listener,
        )
    }

    pub fn candle<F>(
        &self,
        coin: &str,
        interval: &str,
        listener: F,
    ) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        let subscription = Subscription::Candle {
            coin: coin.to_string(),
            interval: interval.to_string(),
        };
        self.subscribe_raw(subscription, listener)
    }

    pub fn bbo<F>(&self, coin: &str, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe_raw(
            Subscription::Bbo {
                coin: coin.to_string(),
            },
            listener,
        )
    }

    // ── User channels ────────────────────────────────────────────────────

    pub fn user_events<F>(&self, user: Address, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe_raw(Subscription::UserEvents { user }, listener)
    }

    pub fn order_updates<F>(&self, user: Address, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe_raw(Subscription::OrderUpdates { user }, listener)
    }

    pub fn user_fills<F>(&self, user: Address, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        let subscription = Subscription::UserFills {
            user,
            aggregate_by_time: None,
        };
        self.subscribe_raw(subscription, listener)
    }

    pub fn notification<F>(&self, user: Address, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe_raw(Subscription::Notification { user }, listener)
    }

    pub fn web_data2<F>(&self, user: Address, listener: F) -> Result<SubscriptionHandle, SdkError>
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.subscribe_raw(Subscription::WebData2 { user }, listener)
    }

    // ── Connection ───────────────────────────────────────────────────────

    pub fn ready_state(&self) -> ReadyState {
        self.client.ws.ready_state()
    }

    /// Connection lifecycle events. See [`WsTransport::events`].
    pub fn lifecycle(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        self.client.ws.events()
    }

    /// Close the shared connection. Every handle stops receiving.
    pub async fn close(&self) {
        self.client.ws.close().await;
    }
}

/// A registered listener.
///
/// Dropping the handle unsubscribes. Removal is immediate: no push is
/// delivered to the listener afterwards, even while the wire unsubscribe is
/// still on its way.
pub struct SubscriptionHandle {
    id: ListenerId,
    subscription: Subscription,
    transport: Arc<WsTransport>,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            self.transport.remove_listener(self.id);
            task.abort();
            tracing::debug!(listener = self.id, "Listener removed");
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("subscription", &self.subscription)
            .finish()
    }
}
