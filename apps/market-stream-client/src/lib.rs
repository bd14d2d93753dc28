#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Market Stream Client
//!
//! A streaming client that maintains a continuously-updated view of a
//! subscribed instrument set against an unreliable transport. Push
//! delivery is attempted first; connection loss is recovered with
//! bounded exponential backoff; when the push channel is unavailable
//! or the retry budget is exhausted the client degrades transparently
//! to periodic polling of the same subscription set.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Quote and symbol types, the subscription set, and the
//!   connection state machine.
//! - **Application**: Transport ports, the reconnect policy, and the
//!   `StreamingMarketClient` orchestration.
//! - **Infrastructure**: WebSocket push adapter, REST poll adapter,
//!   configuration, telemetry, metrics.
//!
//! # Data Flow
//!
//! ```text
//! Push (WebSocket) ──┐
//!                    ├──► dispatch ──► consumer channel (MarketEvent)
//! Poll (REST)  ──────┘
//! ```
//!
//! Exactly one transport delivers at any instant; the consumer sees a
//! uniform quote stream regardless of which is active.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core market data types with no transport dependencies.
pub mod domain;

/// Application layer - Ports and the streaming client service.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::connection::ConnectionState;
pub use domain::quote::{LatencyTier, MarketSymbol, Quote, Symbol};
pub use domain::subscription::{AnnounceOp, Announcement, SubscriptionSet};

// Client and ports
pub use application::client::reconnect::{ReconnectConfig, ReconnectPolicy};
pub use application::client::{
    ClientError, ClientSettings, MarketEvent, StreamingMarketClient, TransportMode,
};
pub use application::ports::{
    PushEvent, PushSession, PushTransport, SnapshotSource, TransportError,
};

// Infrastructure adapters
pub use infrastructure::config::{ConfigError, StreamConfig};
pub use infrastructure::metrics::init_metrics;
pub use infrastructure::push::WebSocketPushTransport;
pub use infrastructure::rest::{RestClientConfig, RestMarketDataClient};
