//! Domain Layer - Core market data types and business logic.
//!
//! This layer contains the core domain types for the streaming client
//! with no transport dependencies. All types here are pure Rust with
//! serialization support.

/// Market data value types (quotes, symbols, latency tiers).
pub mod quote;

/// Subscription set tracking and announcements.
pub mod subscription;

/// Connection lifecycle state machine.
pub mod connection;
