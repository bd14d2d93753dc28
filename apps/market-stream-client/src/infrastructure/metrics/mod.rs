//! Prometheus Metrics Module
//!
//! Exposes client metrics in Prometheus format.
//!
//! # Metrics
//!
//! - `market_stream_connects_total`: successful push connections
//! - `market_stream_reconnects_total`: push reconnection attempts
//! - `market_stream_push_errors_total`: non-fatal push transport errors
//! - `market_stream_poll_failures_total`: failed poll snapshot requests
//! - `market_stream_batches_dispatched_total`: quote batches delivered
//! - `market_stream_connection_state`: current lifecycle state (1 per state label)
//! - `market_stream_subscriptions`: current subscription set size

use std::sync::OnceLock;

use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "market_stream_connects_total",
        "Successful push transport connections"
    );
    describe_counter!(
        "market_stream_reconnects_total",
        "Push transport reconnection attempts"
    );
    describe_counter!(
        "market_stream_push_errors_total",
        "Non-fatal push transport errors"
    );
    describe_counter!(
        "market_stream_poll_failures_total",
        "Failed poll snapshot requests"
    );
    describe_counter!(
        "market_stream_batches_dispatched_total",
        "Quote batches delivered to the consumer"
    );

    describe_gauge!(
        "market_stream_connection_state",
        "Connection lifecycle state (1 for the active state label, 0 otherwise)"
    );
    describe_gauge!(
        "market_stream_subscriptions",
        "Number of currently subscribed symbols"
    );
}
