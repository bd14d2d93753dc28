//! Port Interfaces
//!
//! Contracts between the streaming client and its transports,
//! following the Hexagonal Architecture pattern. Infrastructure
//! adapters implement these; tests substitute stubs.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`PushTransport`] / [`PushSession`]: duplex push channel
//!   (announce subscriptions, receive quote frames and close events)
//! - [`SnapshotSource`]: one-shot quote snapshot request used by the
//!   poll loop and for ad-hoc snapshot fetches

use async_trait::async_trait;

use crate::domain::quote::{LatencyTier, Quote, Symbol};
use crate::domain::subscription::Announcement;

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced by transport adapters.
///
/// All of these are recoverable from the client's point of view:
/// open failures degrade to polling, runtime failures retry or
/// degrade, and poll failures retry on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The push channel is not supported or not configured.
    #[error("push transport unsupported: {0}")]
    Unsupported(String),

    /// Opening the transport failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Sending a control message failed.
    #[error("send failed: {0}")]
    Send(String),

    /// A snapshot request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// An inbound payload could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
}

// =============================================================================
// Push Transport
// =============================================================================

/// Inbound event from an open push session.
#[derive(Debug, Clone)]
pub enum PushEvent {
    /// A batch of quotes arrived.
    Quotes(Vec<Quote>),
    /// A non-fatal error occurred; the session is still usable.
    Error(String),
    /// The session closed. `clean` distinguishes a deliberate close
    /// from a connection loss that should trigger reconnection.
    Closed {
        /// Whether the close was clean (caller- or server-initiated shutdown).
        clean: bool,
    },
}

/// Factory for push sessions.
///
/// `open` is called once on `connect()` and again for every
/// reconnection attempt.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Open a new push session.
    async fn open(&self) -> Result<Box<dyn PushSession>, TransportError>;
}

/// An open duplex push session.
#[async_trait]
pub trait PushSession: Send {
    /// Send a subscription announcement to the server.
    async fn announce(&mut self, announcement: &Announcement) -> Result<(), TransportError>;

    /// Receive the next inbound event.
    ///
    /// After a `Closed` event the session must not be used again.
    async fn next_event(&mut self) -> PushEvent;

    /// Close the session cleanly. Idempotent.
    async fn close(&mut self);
}

// =============================================================================
// Snapshot Source (poll transport)
// =============================================================================

/// One-shot quote snapshot requester.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current quotes for the given symbols at the given tier.
    async fn fetch_quotes(
        &self,
        symbols: &[Symbol],
        latency: LatencyTier,
    ) -> Result<Vec<Quote>, TransportError>;
}
