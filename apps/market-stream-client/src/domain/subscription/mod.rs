//! Subscription Set Tracking
//!
//! Domain types for the set of instruments the client wants updates
//! for, and the control messages announcing that set to the push
//! endpoint.
//!
//! # Design
//!
//! The subscription set is owned by the client and mutated only
//! through `subscribe`/`unsubscribe`; both transports read it to know
//! what to announce or request. Membership is unique and unordered:
//! duplicate subscribes and removals of absent symbols are no-ops.
//! Mutations report which symbols actually changed so the client can
//! send minimal announcements while connected, and the full set can
//! be replayed as a single announcement after every (re)connection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::quote::{LatencyTier, Symbol};

// =============================================================================
// Announcements
// =============================================================================

/// Announcement operation sent to the push endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnounceOp {
    /// Subscribe to the listed symbols.
    Sub,
    /// Unsubscribe from the listed symbols.
    Unsub,
}

/// Control message announcing subscription changes over the push channel.
///
/// # Wire Format (JSON)
/// ```json
/// {"op": "sub", "symbols": ["ZCZ5", "GCZ5"], "latency": "delayed15"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Operation to apply.
    pub op: AnnounceOp,
    /// Symbols the operation applies to.
    pub symbols: Vec<Symbol>,
    /// Latency tier for the subscription.
    pub latency: LatencyTier,
}

// =============================================================================
// Subscription Set
// =============================================================================

/// The set of instrument symbols the client currently wants updates for.
///
/// Reflects the union of all symbols requested since the last clear.
/// Carries the latency tier of the most recent subscribe so a
/// transport switch requests the same data the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    symbols: HashSet<Symbol>,
    latency: LatencyTier,
}

impl SubscriptionSet {
    /// Create an empty subscription set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add symbols to the set at the given latency tier.
    ///
    /// Returns the symbols that were not already present (idempotent
    /// union). The latency tier is updated even when no new symbols
    /// were added.
    pub fn add(&mut self, symbols: &[Symbol], latency: LatencyTier) -> Vec<Symbol> {
        self.latency = latency;

        let mut added = Vec::new();
        for symbol in symbols {
            if self.symbols.insert(symbol.clone()) {
                added.push(symbol.clone());
            }
        }
        added
    }

    /// Remove symbols from the set.
    ///
    /// Returns the symbols that were actually present (removing an
    /// absent symbol is a no-op).
    pub fn remove(&mut self, symbols: &[Symbol]) -> Vec<Symbol> {
        let mut removed = Vec::new();
        for symbol in symbols {
            if self.symbols.remove(symbol) {
                removed.push(symbol.clone());
            }
        }
        removed
    }

    /// Remove all symbols.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Check whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of subscribed symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check membership of a symbol.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Current latency tier.
    #[must_use]
    pub const fn latency(&self) -> LatencyTier {
        self.latency
    }

    /// All subscribed symbols, sorted for deterministic output.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<_> = self.symbols.iter().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Build an announcement replaying the full current set.
    ///
    /// Returns `None` when the set is empty (nothing to announce).
    /// Sent once after every successful (re)connection so a client
    /// that subscribed before connecting gets served.
    #[must_use]
    pub fn replay_announcement(&self) -> Option<Announcement> {
        if self.is_empty() {
            None
        } else {
            Some(Announcement {
                op: AnnounceOp::Sub,
                symbols: self.symbols(),
                latency: self.latency,
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
