//! Streaming Market Client
//!
//! Presents a single delivery point for quote batches regardless of
//! which transport is live, and keeps that delivery alive under
//! transport failure.
//!
//! The client attempts push delivery first; if the push channel
//! cannot be opened it degrades to polling immediately, and if an
//! established push connection is lost it retries with exponential
//! backoff before degrading. Degradation to polling is one-way for
//! the lifetime of the client instance.
//!
//! # Concurrency
//!
//! All transport state is owned by a single spawned task; callers
//! interact through synchronous methods that mutate the shared
//! subscription set and a command channel for live announcements.
//! `disconnect()` cancels all pending timers synchronously; no quote
//! batch is dispatched after it returns.

pub mod reconnect;

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{PushEvent, PushSession, PushTransport, SnapshotSource};
use crate::domain::connection::ConnectionState;
use crate::domain::quote::{LatencyTier, Quote, Symbol};
use crate::domain::subscription::{AnnounceOp, Announcement, SubscriptionSet};

use reconnect::{ReconnectConfig, ReconnectPolicy};

// =============================================================================
// Errors
// =============================================================================

/// Errors returned by the client's public surface.
///
/// Transport failures never appear here; they are absorbed internally
/// and surfaced as advisory [`MarketEvent::Error`] events.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// `connect()` was called while a feed is already running.
    #[error("client already started")]
    AlreadyStarted,

    /// `connect()` was called after `disconnect()`; a closed client
    /// is never revived.
    #[error("client is closed")]
    Closed,
}

// =============================================================================
// Events
// =============================================================================

/// Events delivered to the consumer.
///
/// The consumer observes a uniform stream regardless of whether the
/// push or the poll transport produced it.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    /// Push transport connected; the subscription set has been announced.
    Connected,
    /// Push transport lost; a reconnect attempt is scheduled.
    Reconnecting {
        /// Reconnection attempt number.
        attempt: u32,
    },
    /// Degraded to the poll transport.
    Polling,
    /// A batch of quotes, in transport arrival order. No dedup and no
    /// ordering guarantee across a transport switch.
    Quotes(Vec<Quote>),
    /// Advisory transport error; the feed stays alive.
    Error(String),
    /// The server closed the feed cleanly.
    Closed,
}

// =============================================================================
// Settings
// =============================================================================

/// Which transports the client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Attempt push first; poll only as a degradation.
    #[default]
    PushFirst,
    /// Never attempt push; poll at the passive interval.
    PollOnly,
}

impl TransportMode {
    /// Parse a mode from a string, defaulting to `PushFirst`.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "poll" | "poll_only" | "pollonly" => Self::PollOnly,
            _ => Self::PushFirst,
        }
    }
}

/// Tuning knobs for the client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Reconnect policy configuration.
    pub reconnect: ReconnectConfig,
    /// Poll interval when degraded from a failed push transport.
    pub degraded_poll_interval: Duration,
    /// Poll interval for a client that never attempts push.
    pub passive_poll_interval: Duration,
    /// Transport selection.
    pub mode: TransportMode,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            reconnect: ReconnectConfig::default(),
            degraded_poll_interval: Duration::from_secs(5),
            passive_poll_interval: Duration::from_secs(30),
            mode: TransportMode::PushFirst,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Outcome of the reconnect phase.
enum ReconnectOutcome {
    /// A fresh push session was established.
    Session(Box<dyn PushSession>),
    /// The attempt budget is exhausted; degrade to polling.
    Degraded,
    /// The client was disconnected while reconnecting.
    Cancelled,
}

/// A live market-data feed over an unreliable transport.
///
/// Owns the subscription set, the connection lifecycle state machine,
/// the reconnect policy, and the dispatch of quote batches to a single
/// consumer channel.
pub struct StreamingMarketClient {
    settings: ClientSettings,
    push: Arc<dyn PushTransport>,
    snapshots: Arc<dyn SnapshotSource>,
    subscriptions: RwLock<SubscriptionSet>,
    state: RwLock<ConnectionState>,
    commands: Mutex<Option<mpsc::UnboundedSender<Announcement>>>,
    cancel: CancellationToken,
}

impl StreamingMarketClient {
    /// Create a new client. No transport activity happens until
    /// [`connect`](Self::connect).
    #[must_use]
    pub fn new(
        settings: ClientSettings,
        push: Arc<dyn PushTransport>,
        snapshots: Arc<dyn SnapshotSource>,
    ) -> Self {
        Self {
            settings,
            push,
            snapshots,
            subscriptions: RwLock::new(SubscriptionSet::new()),
            state: RwLock::new(ConnectionState::Disconnected),
            commands: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Currently subscribed symbols, sorted.
    #[must_use]
    pub fn active_subscriptions(&self) -> Vec<Symbol> {
        self.subscriptions.read().symbols()
    }

    /// Add symbols to the subscription set.
    ///
    /// Duplicate symbols are an idempotent union. While connected the
    /// newly added symbols are announced over the push transport;
    /// otherwise the enlarged set is replayed on the next successful
    /// connection or read by the next poll tick. A no-op after
    /// `disconnect()`.
    pub fn subscribe(&self, symbols: &[Symbol], latency: LatencyTier) {
        if self.state().is_terminal() {
            return;
        }

        let added = self.subscriptions.write().add(symbols, latency);
        if added.is_empty() {
            return;
        }
        self.record_subscription_count();

        tracing::debug!(added = added.len(), latency = latency.as_str(), "subscribed");

        if self.state() == ConnectionState::Connected {
            self.send_command(Announcement {
                op: AnnounceOp::Sub,
                symbols: added,
                latency,
            });
        }
    }

    /// Remove symbols from the subscription set.
    ///
    /// Removing an absent symbol is a no-op. While connected the
    /// removed symbols are announced over the push transport.
    pub fn unsubscribe(&self, symbols: &[Symbol]) {
        if self.state().is_terminal() {
            return;
        }

        let (removed, latency) = {
            let mut subs = self.subscriptions.write();
            (subs.remove(symbols), subs.latency())
        };
        if removed.is_empty() {
            return;
        }
        self.record_subscription_count();

        tracing::debug!(removed = removed.len(), "unsubscribed");

        if self.state() == ConnectionState::Connected {
            self.send_command(Announcement {
                op: AnnounceOp::Unsub,
                symbols: removed,
                latency,
            });
        }
    }

    /// Start the feed, delivering events to `events`.
    ///
    /// Attempts to open the push transport; on success the full
    /// current subscription set is announced once and push delivery
    /// begins. On failure the client degrades to polling immediately
    /// and the poll loop serves the current set — the caller does not
    /// need to do anything else.
    ///
    /// Resolves once the initial attempt has settled and returns the
    /// resulting state (`Connected` or `Polling`).
    ///
    /// # Errors
    ///
    /// Returns an error only on caller misuse: calling `connect` on a
    /// running or closed client. Transport failures are not errors.
    pub async fn connect(
        self: &Arc<Self>,
        events: mpsc::Sender<MarketEvent>,
    ) -> Result<ConnectionState, ClientError> {
        match self.state() {
            ConnectionState::Disconnected => {}
            ConnectionState::Closed => return Err(ClientError::Closed),
            _ => return Err(ClientError::AlreadyStarted),
        }
        if !self.transition(ConnectionState::Connecting) {
            return Err(ClientError::Closed);
        }

        if self.settings.mode == TransportMode::PollOnly {
            return self
                .enter_polling(events, self.settings.passive_poll_interval)
                .ok_or(ClientError::Closed);
        }

        match self.push.open().await {
            Ok(session) => {
                if !self.transition(ConnectionState::Connected) {
                    // disconnect() raced the open
                    let mut session = session;
                    session.close().await;
                    return Err(ClientError::Closed);
                }

                let (command_tx, command_rx) = mpsc::unbounded_channel();
                *self.commands.lock() = Some(command_tx);
                counter!("market_stream_connects_total").increment(1);

                let client = Arc::clone(self);
                tokio::spawn(async move {
                    client.session_loop(session, command_rx, events).await;
                });

                Ok(ConnectionState::Connected)
            }
            Err(e) => {
                tracing::warn!(error = %e, "push transport unavailable, degrading to polling");
                self.send_event(&events, MarketEvent::Error(e.to_string()))
                    .await;
                self.enter_polling(events, self.settings.degraded_poll_interval)
                    .ok_or(ClientError::Closed)
            }
        }
    }

    /// Shut the feed down. Terminal and idempotent.
    ///
    /// Cancels any pending reconnect or poll timer synchronously,
    /// closes the active transport cleanly, and clears the
    /// subscription set. No quote batch is dispatched after this
    /// returns, even if a delayed transport event arrives afterward.
    pub fn disconnect(&self) {
        {
            let mut state = self.state.write();
            if state.is_terminal() {
                return;
            }
            tracing::info!(from = %*state, "client disconnecting");
            gauge!("market_stream_connection_state", "state" => state.as_str()).set(0.0);
            gauge!("market_stream_connection_state", "state" => ConnectionState::Closed.as_str())
                .set(1.0);
            *state = ConnectionState::Closed;
        }

        self.cancel.cancel();
        self.subscriptions.write().clear();
        self.record_subscription_count();
        *self.commands.lock() = None;
    }

    // -------------------------------------------------------------------------
    // Internal: state machine
    // -------------------------------------------------------------------------

    /// Apply a state transition if it is legal from the current state.
    ///
    /// Returns `false` when the transition is not legal — in practice
    /// when `disconnect()` closed the client concurrently.
    fn transition(&self, next: ConnectionState) -> bool {
        let mut state = self.state.write();
        if state.can_transition_to(next) {
            tracing::debug!(from = %*state, to = %next, "connection state transition");
            gauge!("market_stream_connection_state", "state" => state.as_str()).set(0.0);
            gauge!("market_stream_connection_state", "state" => next.as_str()).set(1.0);
            *state = next;
            true
        } else {
            false
        }
    }

    /// Update the subscription-size gauge from the current set.
    fn record_subscription_count(&self) {
        #[allow(clippy::cast_precision_loss)]
        let count = self.subscriptions.read().len() as f64;
        gauge!("market_stream_subscriptions").set(count);
    }

    /// Push session event loop: replay subscriptions, deliver frames,
    /// and drive the reconnect-or-degrade policy on unclean closes.
    async fn session_loop(
        self: Arc<Self>,
        mut session: Box<dyn PushSession>,
        mut commands: mpsc::UnboundedReceiver<Announcement>,
        events: mpsc::Sender<MarketEvent>,
    ) {
        let mut policy = ReconnectPolicy::new(self.settings.reconnect.clone());

        'connection: loop {
            // Replay the full current set as a single announcement so a
            // client that subscribed before connecting gets served.
            let replay = self.subscriptions.read().replay_announcement();
            if let Some(announcement) = replay
                && let Err(e) = session.announce(&announcement).await
            {
                tracing::warn!(error = %e, "subscription replay failed");
                self.send_event(&events, MarketEvent::Error(e.to_string()))
                    .await;
                match self.reconnect(&mut policy, &events).await {
                    ReconnectOutcome::Session(next) => {
                        session = next;
                        continue 'connection;
                    }
                    ReconnectOutcome::Degraded => {
                        self.degrade_inline(events).await;
                        return;
                    }
                    ReconnectOutcome::Cancelled => return,
                }
            }

            policy.reset();
            self.send_event(&events, MarketEvent::Connected).await;

            loop {
                tokio::select! {
                    () = self.cancel.cancelled() => {
                        session.close().await;
                        return;
                    }
                    cmd = commands.recv() => {
                        let Some(announcement) = cmd else {
                            // Sender dropped: disconnect() is in progress.
                            session.close().await;
                            return;
                        };
                        if let Err(e) = session.announce(&announcement).await {
                            tracing::warn!(error = %e, "announcement failed");
                            self.send_event(&events, MarketEvent::Error(e.to_string())).await;
                            break;
                        }
                    }
                    event = session.next_event() => match event {
                        PushEvent::Quotes(batch) => {
                            self.dispatch(&events, batch).await;
                        }
                        PushEvent::Error(msg) => {
                            // Advisory: the close event drives any transition.
                            counter!("market_stream_push_errors_total").increment(1);
                            tracing::warn!(error = %msg, "push transport error");
                            self.send_event(&events, MarketEvent::Error(msg)).await;
                        }
                        PushEvent::Closed { clean: true } => {
                            tracing::info!("push transport closed cleanly");
                            if self.transition(ConnectionState::Closed) {
                                self.send_event(&events, MarketEvent::Closed).await;
                            }
                            return;
                        }
                        PushEvent::Closed { clean: false } => {
                            tracing::warn!("push transport lost");
                            break;
                        }
                    }
                }
            }

            match self.reconnect(&mut policy, &events).await {
                ReconnectOutcome::Session(next) => session = next,
                ReconnectOutcome::Degraded => {
                    self.degrade_inline(events).await;
                    return;
                }
                ReconnectOutcome::Cancelled => return,
            }
        }
    }

    /// Retry the push transport under the backoff policy.
    async fn reconnect(
        &self,
        policy: &mut ReconnectPolicy,
        events: &mpsc::Sender<MarketEvent>,
    ) -> ReconnectOutcome {
        if !self.transition(ConnectionState::Reconnecting) {
            return ReconnectOutcome::Cancelled;
        }

        loop {
            let Some(delay) = policy.next_delay() else {
                tracing::warn!(
                    max_attempts = policy.attempt_count(),
                    "reconnect budget exhausted, degrading to polling"
                );
                return ReconnectOutcome::Degraded;
            };
            let attempt = policy.attempt_count();

            counter!("market_stream_reconnects_total").increment(1);
            self.send_event(events, MarketEvent::Reconnecting { attempt })
                .await;
            tracing::info!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "scheduling push reconnect"
            );

            tokio::select! {
                () = self.cancel.cancelled() => return ReconnectOutcome::Cancelled,
                () = tokio::time::sleep(delay) => {}
            }

            match self.push.open().await {
                Ok(session) => {
                    if !self.transition(ConnectionState::Connected) {
                        let mut session = session;
                        session.close().await;
                        return ReconnectOutcome::Cancelled;
                    }
                    counter!("market_stream_connects_total").increment(1);
                    return ReconnectOutcome::Session(session);
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "push reconnect failed");
                    self.send_event(events, MarketEvent::Error(e.to_string()))
                        .await;
                }
            }
        }
    }

    /// Transition to `Polling` and spawn the poll loop.
    ///
    /// Returns the resulting state, or `None` when `disconnect()` won
    /// the race.
    fn enter_polling(
        self: &Arc<Self>,
        events: mpsc::Sender<MarketEvent>,
        interval: Duration,
    ) -> Option<ConnectionState> {
        if !self.transition(ConnectionState::Polling) {
            return None;
        }

        let client = Arc::clone(self);
        tokio::spawn(async move {
            client.send_event(&events, MarketEvent::Polling).await;
            client.poll_loop(events, interval).await;
        });

        Some(ConnectionState::Polling)
    }

    /// Degrade to polling from within the session task.
    async fn degrade_inline(&self, events: mpsc::Sender<MarketEvent>) {
        if !self.transition(ConnectionState::Polling) {
            return;
        }
        self.send_event(&events, MarketEvent::Polling).await;
        self.poll_loop(events, self.settings.degraded_poll_interval)
            .await;
    }

    /// Poll the snapshot source for the current subscription set on a
    /// fixed interval. A failed request is surfaced and retried on the
    /// next tick; the loop only stops on cancellation.
    async fn poll_loop(&self, events: mpsc::Sender<MarketEvent>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let (symbols, latency) = {
                let subs = self.subscriptions.read();
                (subs.symbols(), subs.latency())
            };
            if symbols.is_empty() {
                continue;
            }

            match self.snapshots.fetch_quotes(&symbols, latency).await {
                Ok(quotes) => self.dispatch(&events, quotes).await,
                Err(e) => {
                    counter!("market_stream_poll_failures_total").increment(1);
                    tracing::warn!(error = %e, "poll request failed, retrying next tick");
                    self.send_event(&events, MarketEvent::Error(e.to_string()))
                        .await;
                }
            }
        }
    }

    /// Single dispatch path shared by both transports. No filtering:
    /// the caller requested exactly what it wants.
    async fn dispatch(&self, events: &mpsc::Sender<MarketEvent>, batch: Vec<Quote>) {
        if self.cancel.is_cancelled() {
            return;
        }
        counter!("market_stream_batches_dispatched_total").increment(1);
        let _ = events.send(MarketEvent::Quotes(batch)).await;
    }

    /// Send an advisory event unless the client has been closed.
    async fn send_event(&self, events: &mpsc::Sender<MarketEvent>, event: MarketEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = events.send(event).await;
    }

    /// Forward an announcement to the live session task, if any.
    fn send_command(&self, announcement: Announcement) {
        if let Some(tx) = self.commands.lock().as_ref() {
            let _ = tx.send(announcement);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
