//! Native WebSocket transport — `tokio-tungstenite`.
//!
//! Full implementation with:
//! - Lazy start: the background task is spawned on the first subscribe or post
//! - Application-level ping/pong health check
//! - Exponential backoff reconnection with jitter
//! - Subscription replay in registration order on every (re)connect
//! - Correlated posts; in-flight posts fail with `ConnectionLost` on disconnect
//! - Stream-based lifecycle event delivery to the consumer

use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream, Stream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{ApiRequestError, SdkError, WsError};
use crate::transport::{Endpoint, Transport};
use crate::ws::subscriptions::{ListenerId, Subscription, SubscriptionRegistry};
use crate::ws::{Kind, MessageIn, MessageOut, PostOutcome, PostRequest, ReadyState, WsConfig, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Sink = SplitSink<WsStream, Message>;
type Reply = oneshot::Sender<Result<Value, SdkError>>;

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Subscribe(Subscription),
    Unsubscribe(Subscription),
    Post {
        id: u64,
        request: PostRequest,
        reply: Reply,
    },
    /// The caller stopped waiting for a post.
    Abandon(u64),
    Close,
}

// ─── Disconnect reasons for reconnection decision ────────────────────────────

enum DisconnectReason {
    UserRequested,
    /// Every handle to the transport is gone.
    Dropped,
    Lost(String),
}

// ─── State shared between the public handle and the task ─────────────────────

struct Shared {
    registry: Mutex<SubscriptionRegistry>,
    ready_state: AtomicU8,
    next_post_id: AtomicU64,
    event_tx: mpsc::Sender<WsEvent>,
}

impl Shared {
    fn registry(&self) -> MutexGuard<'_, SubscriptionRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ReadyState) {
        self.ready_state.store(state as u8, Ordering::SeqCst);
    }

    fn state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    fn emit(&self, event: WsEvent) {
        let _ = self.event_tx.try_send(event);
    }
}

enum TaskSlot {
    Idle,
    Running {
        cmd_tx: mpsc::UnboundedSender<Command>,
        handle: JoinHandle<()>,
    },
    Closed,
}

// ─── Background task state ───────────────────────────────────────────────────

struct PendingPost {
    reply: Reply,
    endpoint_kind: String,
}

struct QueuedPost {
    id: u64,
    request: PostRequest,
    reply: Reply,
}

struct TaskState {
    config: WsConfig,
    shared: Arc<Shared>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    /// Subscription keys with a subscribe frame on the current connection.
    live: HashSet<String>,
    /// Posts written to the current connection, awaiting a reply.
    in_flight: HashMap<u64, PendingPost>,
    /// Posts issued while no connection was open.
    queued: Vec<QueuedPost>,
    reconnect_attempts: u32,
}

impl TaskState {
    /// Registered listeners keep the task reconnecting past the attempt limit.
    fn should_reconnect(&self) -> bool {
        self.config.reconnect
            && (!self.over_limit() || !self.shared.registry().is_empty())
    }

    fn over_limit(&self) -> bool {
        self.reconnect_attempts >= self.config.max_reconnect_attempts
    }

    /// Fail every post that reached the wire. They are never resent.
    fn reject_in_flight(&mut self) {
        if self.in_flight.is_empty() {
            return;
        }
        tracing::warn!(
            "Connection lost with {} post(s) in flight",
            self.in_flight.len()
        );
        for (_, pending) in self.in_flight.drain() {
            let _ = pending.reply.send(Err(WsError::ConnectionLost.into()));
        }
    }

    fn reject_queued(&mut self, error: impl Fn() -> WsError) {
        for post in self.queued.drain(..) {
            let _ = post.reply.send(Err(error().into()));
        }
    }

    /// Handle a command while no connection is open.
    /// Returns the reason to stop, if any.
    fn handle_offline(&mut self, cmd: Option<Command>) -> Option<DisconnectReason> {
        match cmd {
            // Replayed from the registry once connected.
            Some(Command::Subscribe(_)) | Some(Command::Unsubscribe(_)) => None,
            Some(Command::Post { id, request, reply }) => {
                if self.reconnect_attempts > self.config.max_reconnect_attempts {
                    let _ = reply.send(Err(limit_error(self.reconnect_attempts).into()));
                } else {
                    self.queued.push(QueuedPost { id, request, reply });
                }
                None
            }
            Some(Command::Abandon(id)) => {
                self.queued.retain(|p| p.id != id);
                None
            }
            Some(Command::Close) => Some(DisconnectReason::UserRequested),
            None => Some(DisconnectReason::Dropped),
        }
    }
}

// ─── Public WsTransport ──────────────────────────────────────────────────────

/// Stream transport over one multiplexed WebSocket connection.
///
/// Uses a background tokio task for connection management, started on the
/// first subscribe or post. The public API communicates with it via an mpsc
/// channel; the subscription registry is shared so that listener removal
/// takes effect immediately.
pub struct WsTransport {
    config: WsConfig,
    shared: Arc<Shared>,
    slot: Mutex<TaskSlot>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<WsEvent>>,
}

impl WsTransport {
    /// Create a new transport. Does not connect yet.
    pub fn new(config: WsConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        Self {
            config,
            shared: Arc::new(Shared {
                registry: Mutex::new(SubscriptionRegistry::new()),
                ready_state: AtomicU8::new(ReadyState::Idle as u8),
                next_post_id: AtomicU64::new(1),
                event_tx,
            }),
            slot: Mutex::new(TaskSlot::Idle),
            event_rx: tokio::sync::Mutex::new(event_rx),
        }
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    fn slot(&self) -> MutexGuard<'_, TaskSlot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sender to the running task, spawning it if needed.
    fn command_sender(&self) -> Result<mpsc::UnboundedSender<Command>, WsError> {
        let mut slot = self.slot();
        if let TaskSlot::Running { cmd_tx, .. } = &*slot {
            if !cmd_tx.is_closed() {
                return Ok(cmd_tx.clone());
            }
        }
        if matches!(*slot, TaskSlot::Closed) {
            return Err(WsError::Closed);
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        self.shared.set_state(ReadyState::Connecting);
        let state = TaskState {
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
            cmd_rx,
            live: HashSet::new(),
            in_flight: HashMap::new(),
            queued: Vec::new(),
            reconnect_attempts: 0,
        };
        let handle = tokio::spawn(run_task(state));
        *slot = TaskSlot::Running {
            cmd_tx: cmd_tx.clone(),
            handle,
        };
        Ok(cmd_tx)
    }

    /// Register a listener for `subscription`.
    ///
    /// The wire subscribe is sent only for the first listener of an identical
    /// subscription.
    pub fn add_listener(
        &self,
        subscription: Subscription,
    ) -> Result<(ListenerId, mpsc::UnboundedReceiver<Arc<Value>>), WsError> {
        let cmd_tx = self.command_sender()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.shared.registry();
        let (id, first) = registry.add(subscription.clone(), tx);
        if first {
            // Sent under the registry lock so commands follow registry order.
            cmd_tx
                .send(Command::Subscribe(subscription))
                .map_err(|_| WsError::NotConnected)?;
        }
        Ok((id, rx))
    }

    /// Remove a listener. Takes effect immediately; the wire unsubscribe, when
    /// this was the last listener, is sent asynchronously.
    pub fn remove_listener(&self, id: ListenerId) {
        let mut registry = self.shared.registry();
        if let Some(subscription) = registry.remove(id) {
            if let TaskSlot::Running { cmd_tx, .. } = &*self.slot() {
                let _ = cmd_tx.send(Command::Unsubscribe(subscription));
            }
        }
    }

    /// Number of distinct active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.shared.registry().len()
    }

    /// Send a post and wait for its correlated reply.
    pub async fn post(
        &self,
        endpoint: Endpoint,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, SdkError> {
        let cmd_tx = self.command_sender()?;
        let id = self.shared.next_post_id.fetch_add(1, Ordering::SeqCst);
        let (reply, rx) = oneshot::channel();
        let request = PostRequest {
            kind: endpoint.post_kind().to_string(),
            payload,
        };
        cmd_tx
            .send(Command::Post { id, request, reply })
            .map_err(|_| WsError::NotConnected)?;

        let deadline = timeout.unwrap_or(Duration::from_millis(self.config.post_timeout_ms));
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(WsError::ConnectionLost.into()),
            Err(_) => {
                let _ = cmd_tx.send(Command::Abandon(id));
                tracing::warn!(id, "Post timed out after {}ms", deadline.as_millis());
                Err(SdkError::Timeout(deadline))
            }
        }
    }

    /// Close the connection for good.
    ///
    /// Drops every subscription, fails every pending post and disables
    /// reconnection.
    pub async fn close(&self) {
        let previous = std::mem::replace(&mut *self.slot(), TaskSlot::Closed);
        self.shared.registry().clear();

        match previous {
            TaskSlot::Running { cmd_tx, handle } => {
                if cmd_tx.send(Command::Close).is_ok() {
                    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
                } else {
                    // The task already gave up.
                    self.shared.emit(WsEvent::Closed);
                }
            }
            TaskSlot::Idle => self.shared.emit(WsEvent::Closed),
            TaskSlot::Closed => {}
        }
        self.shared.set_state(ReadyState::Closed);
    }

    /// Whether the WebSocket is currently open.
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Current connection state.
    pub fn ready_state(&self) -> ReadyState {
        self.shared.state()
    }

    /// Get a stream of lifecycle events.
    ///
    /// The returned stream borrows `self`, so it must be dropped
    /// before the transport is.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = WsEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn request(
        &self,
        endpoint: Endpoint,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, SdkError> {
        self.post(endpoint, payload, timeout).await
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let TaskSlot::Running { handle, .. } = &*self.slot() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    loop {
        // ── 1. Attempt connection ────────────────────────────────────────
        state.shared.set_state(ReadyState::Connecting);
        let connected = match connect(&mut state).await {
            Ok(result) => result,
            Err(reason) => return finish(&mut state, reason),
        };

        let (sink, stream) = match connected {
            Ok(parts) => parts,
            Err(e) => {
                tracing::error!("WebSocket connection failed: {}", e);
                state
                    .shared
                    .emit(WsEvent::Error(format!("Connection failed: {}", e)));
                if !state.should_reconnect() {
                    give_up(&mut state);
                    return;
                }
                match backoff_wait(&mut state).await {
                    None => continue,
                    Some(reason) => return finish(&mut state, reason),
                }
            }
        };

        // ── 2. Connected ─────────────────────────────────────────────────
        state.reconnect_attempts = 0;
        state.shared.set_state(ReadyState::Open);
        tracing::info!("WebSocket connected to {}", state.config.url);

        // ── 3. Replay subscriptions, then flush queued posts ─────────────
        let mut sink = sink;
        state.live.clear();
        resubscribe_all(&mut sink, &mut state).await;
        flush_queued(&mut sink, &mut state).await;
        state.shared.emit(WsEvent::Connected);

        // ── 4. Inner select! loop ────────────────────────────────────────
        let reason = run_connected(&mut state, sink, stream).await;

        // ── 5. Post-disconnect decision ──────────────────────────────────
        match reason {
            DisconnectReason::Lost(reason) => {
                state.reject_in_flight();
                tracing::warn!("WebSocket disconnected: {}", reason);
                if !state.should_reconnect() {
                    give_up(&mut state);
                    return;
                }
                match backoff_wait(&mut state).await {
                    None => continue,
                    Some(reason) => return finish(&mut state, reason),
                }
            }
            other => return finish(&mut state, other),
        }
    }
}

/// The inner connected loop — runs until the connection breaks.
async fn run_connected(
    state: &mut TaskState,
    mut sink: Sink,
    mut stream: SplitStream<WsStream>,
) -> DisconnectReason {
    let ping_dur = Duration::from_millis(state.config.ping_interval_ms as u64);
    let pong_dur = Duration::from_millis(state.config.pong_timeout_ms as u64);

    let mut ping_interval = tokio::time::interval(ping_dur);
    ping_interval.reset(); // skip immediate first tick

    let mut pong_deadline: Option<tokio::time::Instant> = None;

    // When no deadline is active the sleep is parked far in the future.
    let far_future = tokio::time::Instant::now() + Duration::from_secs(86400);
    let pong_sleep = tokio::time::sleep_until(far_future);
    tokio::pin!(pong_sleep);

    loop {
        tokio::select! {
            // ── a) Incoming WS message ───────────────────────────────────
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let text_str: &str = text.as_ref();
                        match MessageIn::parse(text_str) {
                            Ok(Kind::Pong) => {
                                pong_deadline = None;
                                pong_sleep.as_mut().reset(far_future);
                            }
                            Ok(kind) => handle_inbound(state, kind),
                            Err(e) => {
                                tracing::warn!(
                                    "WS deserialization error: {} — raw: {}",
                                    e,
                                    text_str
                                );
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = extract_close(frame.as_ref());
                        state.shared.emit(WsEvent::Disconnected {
                            code: Some(code),
                            reason: reason.clone(),
                        });
                        return DisconnectReason::Lost(format!("closed by server ({code}): {reason}"));
                    }
                    Some(Ok(_)) => {} // Binary, Pong, Frame — ignore
                    Some(Err(e)) => {
                        let reason = e.to_string();
                        tracing::error!("WebSocket error: {}", reason);
                        state.shared.emit(WsEvent::Disconnected {
                            code: None,
                            reason: reason.clone(),
                        });
                        return DisconnectReason::Lost(reason);
                    }
                    None => {
                        state.shared.emit(WsEvent::Disconnected {
                            code: None,
                            reason: "Stream ended".into(),
                        });
                        return DisconnectReason::Lost("Stream ended".into());
                    }
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Subscribe(subscription)) => {
                        let key = subscription.subscription_key();
                        let wanted = state.shared.registry().contains_key(&key);
                        if wanted && state.live.insert(key) {
                            let msg = MessageOut::Subscribe { subscription };
                            if let Err(e) = send_msg(&mut sink, &msg).await {
                                tracing::warn!("Send failed: {}", e);
                            }
                        }
                    }
                    Some(Command::Unsubscribe(subscription)) => {
                        let key = subscription.subscription_key();
                        let wanted = state.shared.registry().contains_key(&key);
                        if !wanted && state.live.remove(&key) {
                            let msg = MessageOut::Unsubscribe { subscription };
                            if let Err(e) = send_msg(&mut sink, &msg).await {
                                tracing::warn!("Send failed: {}", e);
                            }
                        }
                    }
                    Some(Command::Post { id, request, reply }) => {
                        send_post(&mut sink, state, id, request, reply).await;
                    }
                    Some(Command::Abandon(id)) => {
                        state.in_flight.remove(&id);
                    }
                    Some(Command::Close) => {
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "Client disconnect".into(),
                        }))).await;
                        return DisconnectReason::UserRequested;
                    }
                    None => {
                        // WsTransport dropped — clean exit
                        return DisconnectReason::Dropped;
                    }
                }
            }

            // ── c) Ping interval ─────────────────────────────────────────
            _ = ping_interval.tick() => {
                if let Err(e) = send_msg(&mut sink, &MessageOut::Ping).await {
                    tracing::warn!("Failed to send ping: {}", e);
                } else if pong_deadline.is_none() {
                    let deadline = tokio::time::Instant::now() + pong_dur;
                    pong_deadline = Some(deadline);
                    pong_sleep.as_mut().reset(deadline);
                }
            }

            // ── d) Pong timeout ──────────────────────────────────────────
            () = &mut pong_sleep, if pong_deadline.is_some() => {
                tracing::warn!(
                    "Pong timeout — no response within {}ms",
                    state.config.pong_timeout_ms
                );
                state.shared.emit(WsEvent::Disconnected {
                    code: None,
                    reason: "Pong timeout".into(),
                });
                let _ = sink.close().await;
                return DisconnectReason::Lost("Pong timeout".into());
            }
        }
    }
}

/// Route a non-heartbeat frame.
fn handle_inbound(state: &mut TaskState, kind: Kind) {
    match kind {
        Kind::Pong => {}
        Kind::SubscriptionAck(data) => {
            tracing::debug!("Subscription acknowledged: {}", data);
        }
        Kind::PostReply { id, outcome } => {
            let Some(pending) = state.in_flight.remove(&id) else {
                tracing::warn!(id, "Dropping reply for unknown post id");
                return;
            };
            let result = match outcome {
                PostOutcome::Info(data) | PostOutcome::Action(data) => Ok(data),
                PostOutcome::Error(message) => Err(SdkError::Api(ApiRequestError::new(message))),
            };
            tracing::debug!(id, kind = %pending.endpoint_kind, "Post reply received");
            let _ = pending.reply.send(result);
        }
        Kind::MalformedReply { id, detail } => {
            tracing::warn!(id, "{}", detail);
            if let Some(pending) = state.in_flight.remove(&id) {
                let _ = pending.reply.send(Err(WsError::ProtocolError(detail).into()));
            }
        }
        Kind::Error(message) => {
            tracing::warn!("Error frame from server: {}", message);
            state.shared.emit(WsEvent::Error(message));
        }
        Kind::Push { channel, data } => {
            let delivered = state.shared.registry().dispatch(&channel, Arc::new(data));
            if delivered == 0 {
                tracing::warn!(channel = %channel, "Dropping push with no matching subscription");
            }
        }
    }
}

/// Fail everything and settle the final state.
fn finish(state: &mut TaskState, reason: DisconnectReason) {
    let error: fn() -> WsError = match reason {
        DisconnectReason::UserRequested => {
            tracing::info!("WebSocket closed by caller");
            state.shared.registry().clear();
            state.shared.set_state(ReadyState::Closed);
            state.shared.emit(WsEvent::Closed);
            || WsError::Closed
        }
        DisconnectReason::Dropped | DisconnectReason::Lost(_) => {
            state.shared.set_state(ReadyState::Idle);
            || WsError::ConnectionLost
        }
    };
    for (_, pending) in state.in_flight.drain() {
        let _ = pending.reply.send(Err(error().into()));
    }
    state.reject_queued(error);
}

/// Reconnection exhausted with no listener left, or disabled by config.
/// Remaining subscriptions stay registered; the next subscribe or post starts a
/// fresh task that replays them.
fn give_up(state: &mut TaskState) {
    tracing::error!(
        "Giving up after {} reconnect attempt(s)",
        state.reconnect_attempts
    );
    state.reject_in_flight();
    let attempts = state.reconnect_attempts;
    state.reject_queued(|| limit_error(attempts));
    state.shared.set_state(ReadyState::Idle);
    state
        .shared
        .emit(WsEvent::Error("Max reconnect attempts reached".into()));
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn limit_error(attempts: u32) -> WsError {
    WsError::ConnectionFailed(format!("no connection after {attempts} reconnect attempt(s)"))
}

/// Attempt to establish a WebSocket connection with a 30-second timeout.
async fn attempt_connect(url: &str) -> Result<(Sink, SplitStream<WsStream>), String> {
    let (ws_stream, _) = tokio::time::timeout(Duration::from_secs(30), connect_async(url))
        .await
        .map_err(|_| "Connection timeout".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(ws_stream.split())
}

/// Connect while serving commands, so a close during the handshake ends the
/// task before the socket opens.
async fn connect(
    state: &mut TaskState,
) -> Result<Result<(Sink, SplitStream<WsStream>), String>, DisconnectReason> {
    let url = state.config.url.clone();
    let attempt = attempt_connect(&url);
    tokio::pin!(attempt);
    loop {
        tokio::select! {
            result = &mut attempt => return Ok(result),
            cmd = state.cmd_rx.recv() => {
                if let Some(reason) = state.handle_offline(cmd) {
                    return Err(reason);
                }
            }
        }
    }
}

/// Serialize and send a MessageOut over the sink.
async fn send_msg(sink: &mut Sink, msg: &MessageOut) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

async fn send_post(sink: &mut Sink, state: &mut TaskState, id: u64, request: PostRequest, reply: Reply) {
    let endpoint_kind = request.kind.clone();
    let msg = MessageOut::Post { id, request };
    match send_msg(sink, &msg).await {
        Ok(()) => {
            state.in_flight.insert(id, PendingPost { reply, endpoint_kind });
        }
        Err(e) => {
            tracing::warn!(id, "Failed to send post: {}", e);
            let _ = reply.send(Err(WsError::SendFailed(e).into()));
        }
    }
}

/// Extract close code and reason from an optional CloseFrame.
fn extract_close(frame: Option<&CloseFrame>) -> (u16, String) {
    match frame {
        Some(f) => (f.code.into(), f.reason.to_string()),
        None => (1006, "No close frame".into()),
    }
}

// ─── Subscription replay ─────────────────────────────────────────────────────

async fn resubscribe_all(sink: &mut Sink, state: &mut TaskState) {
    let subs: Vec<Subscription> = state.shared.registry().active().cloned().collect();
    if subs.is_empty() {
        return;
    }
    tracing::info!("Resubscribing to {} tracked subscription(s)", subs.len());
    for subscription in subs {
        let key = subscription.subscription_key();
        let msg = MessageOut::Subscribe { subscription };
        match send_msg(sink, &msg).await {
            Ok(()) => {
                state.live.insert(key);
            }
            Err(e) => tracing::warn!("Failed to resubscribe: {}", e),
        }
    }
}

// ─── Post queue ──────────────────────────────────────────────────────────────

async fn flush_queued(sink: &mut Sink, state: &mut TaskState) {
    if state.queued.is_empty() {
        return;
    }
    tracing::info!("Flushing {} queued post(s)", state.queued.len());
    let queued = std::mem::take(&mut state.queued);
    for post in queued {
        send_post(sink, state, post.id, post.request, post.reply).await;
    }
}

// ─── Reconnection backoff ────────────────────────────────────────────────────

/// Exponential delay with jitter, capped at `max_reconnect_delay_ms`.
fn backoff_delay(config: &WsConfig, attempt: u32) -> u64 {
    let exp = attempt.saturating_sub(1).min(16);
    let base = (config.base_reconnect_delay_ms as u64).saturating_mul(1u64 << exp);
    let jitter_max = (config.base_reconnect_delay_ms as u64 / 2).max(1);
    let jitter = rand::random::<u64>() % jitter_max;
    base.saturating_add(jitter)
        .min(config.max_reconnect_delay_ms as u64)
}

/// Sleep out the backoff while still serving commands.
///
/// Returns `Some(reason)` when the caller closed or dropped the transport.
async fn backoff_wait(state: &mut TaskState) -> Option<DisconnectReason> {
    state.reconnect_attempts += 1;
    let delay = backoff_delay(&state.config, state.reconnect_attempts);
    if state.reconnect_attempts > state.config.max_reconnect_attempts && !state.queued.is_empty() {
        let attempts = state.reconnect_attempts;
        state.reject_queued(|| limit_error(attempts));
    }

    tracing::info!(
        "Reconnect attempt {}/{} in {}ms",
        state.reconnect_attempts,
        state.config.max_reconnect_attempts,
        delay
    );
    state.shared.set_state(ReadyState::Reconnecting);
    state.shared.emit(WsEvent::Reconnecting {
        attempt: state.reconnect_attempts,
        delay_ms: delay,
    });

    let sleep = tokio::time::sleep(Duration::from_millis(delay));
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            () = &mut sleep => return None,
            cmd = state.cmd_rx.recv() => {
                if let Some(reason) = state.handle_offline(cmd) {
                    return Some(reason);
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_transport_new_is_idle() {
        let transport = WsTransport::new(WsConfig::default());
        assert_eq!(transport.ready_state(), ReadyState::Idle);
        assert!(!transport.is_connected());
        assert_eq!(transport.subscription_count(), 0);
    }

    #[test]
    fn test_extract_close_with_frame() {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "goodbye".into(),
        };
        let (code, reason) = extract_close(Some(&frame));
        assert_eq!(code, 1000);
        assert_eq!(reason, "goodbye");
    }

    #[test]
    fn test_extract_close_no_frame() {
        let (code, reason) = extract_close(None);
        assert_eq!(code, 1006);
        assert_eq!(reason, "No close frame");
    }

    #[test]
    fn test_backoff_delay_grows_and_caps() {
        let config = WsConfig {
            base_reconnect_delay_ms: 100,
            max_reconnect_delay_ms: 1_000,
            ..Default::default()
        };
        let first = backoff_delay(&config, 1);
        assert!((100..150).contains(&first), "got {first}");
        let third = backoff_delay(&config, 3);
        assert!((400..450).contains(&third), "got {third}");
        assert_eq!(backoff_delay(&config, 30), 1_000);
    }

    #[tokio::test]
    async fn test_close_before_start_is_terminal() {
        let transport = WsTransport::new(WsConfig::default());
        transport.close().await;
        assert_eq!(transport.ready_state(), ReadyState::Closed);

        let err = transport.add_listener(Subscription::AllMids).unwrap_err();
        assert!(matches!(err, WsError::Closed));

        let err = transport
            .post(Endpoint::Info, serde_json::json!({"type": "meta"}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Ws(WsError::Closed)));
    }
}
