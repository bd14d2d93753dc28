//! Connection Lifecycle State Machine
//!
//! The client's connection state drives which transport is active.
//! Exactly one state instance exists per client.
//!
//! # Transitions
//!
//! ```text
//! Disconnected --connect success--> Connected
//! Disconnected --connect failure--> Polling
//! Connected    --clean close-----> Closed
//! Connected    --unclean close---> Reconnecting
//! Reconnecting --success---------> Connected
//! Reconnecting --failure, n<max--> Reconnecting
//! Reconnecting --n>=max----------> Polling
//! (any state)  --disconnect()----> Closed
//! ```
//!
//! `Closed` is terminal: the client is never revived after an
//! explicit shutdown. `Polling` is a one-way degradation; the client
//! does not attempt push again for the lifetime of the instance.

use serde::{Deserialize, Serialize};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Initial state; no transport active.
    #[default]
    Disconnected,
    /// Push transport open attempt in flight.
    Connecting,
    /// Push transport live and delivering.
    Connected,
    /// Push transport lost; backoff timer pending.
    Reconnecting,
    /// Poll transport live and delivering.
    Polling,
    /// Explicitly shut down; terminal.
    Closed,
}

impl ConnectionState {
    /// Get the state name for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Polling => "polling",
            Self::Closed => "closed",
        }
    }

    /// Check whether this state is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check whether a transition to `next` is legal.
    ///
    /// `Closed` is reachable from every state (explicit shutdown) but
    /// has no outgoing transitions.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Closed {
            return true;
        }

        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Connected | Self::Polling)
                | (Self::Connected, Self::Reconnecting)
                | (
                    Self::Reconnecting,
                    Self::Reconnecting | Self::Connected | Self::Polling
                )
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
