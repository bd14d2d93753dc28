//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the port interfaces defined in the
//! application layer.

/// WebSocket push transport adapter.
pub mod push;

/// REST snapshot (poll) adapter and symbol catalog client.
pub mod rest;

/// Configuration loading.
pub mod config;

/// Tracing/logging initialization.
pub mod telemetry;

/// Prometheus metrics instrumentation.
pub mod metrics;
