//! Market Stream Client Binary
//!
//! Starts a live quote feed and logs what it delivers.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-stream-client
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKET_STREAM_BASE_URL`: Market data HTTP API base URL
//!
//! ## Optional
//! - `MARKET_STREAM_PUSH_URL`: Push endpoint (default: derived from base URL)
//! - `MARKET_STREAM_EXCHANGE`: Exchange id (default: CBOT)
//! - `MARKET_STREAM_SYMBOLS`: Startup subscription, CSV (e.g. "ZCZ5,GCZ5")
//! - `MARKET_STREAM_LATENCY`: realtime | delayed15 | eod (default: realtime)
//! - `MARKET_STREAM_MODE`: push_first | poll_only (default: push_first)
//! - `MARKET_STREAM_POLL_INTERVAL_SECS`: Degraded poll interval (default: 5)
//! - `MARKET_STREAM_PASSIVE_POLL_INTERVAL_SECS`: Poll-only interval (default: 30)
//! - `MARKET_STREAM_RECONNECT_DELAY_BASE_MS`: Backoff base delay (default: 1000)
//! - `MARKET_STREAM_MAX_RECONNECT_ATTEMPTS`: Retry budget (default: 5)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use market_stream_client::infrastructure::telemetry;
use market_stream_client::{
    MarketEvent, RestClientConfig, RestMarketDataClient, StreamConfig, StreamingMarketClient,
    WebSocketPushTransport, init_metrics,
};
use tokio::signal;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    telemetry::init();

    tracing::info!("Starting market stream client");

    let _metrics_handle = init_metrics();

    let config = StreamConfig::from_env()?;
    log_config(&config);

    let push = Arc::new(WebSocketPushTransport::new(
        config.endpoints.push_url.clone(),
    ));
    let snapshots = Arc::new(RestMarketDataClient::new(RestClientConfig::new(
        config.endpoints.base_url.clone(),
        config.endpoints.exchange.clone(),
    ))?);

    // Print the catalog so an operator can see what is subscribable
    match snapshots.fetch_symbols().await {
        Ok(catalog) => tracing::info!(instruments = catalog.len(), "symbol catalog loaded"),
        Err(e) => tracing::warn!(error = %e, "symbol catalog unavailable"),
    }

    let client = Arc::new(StreamingMarketClient::new(
        config.client_settings(),
        push,
        snapshots,
    ));

    if !config.symbols.is_empty() {
        client.subscribe(&config.symbols, config.latency);
    }

    let (event_tx, event_rx) = mpsc::channel::<MarketEvent>(1024);
    let state = client.connect(event_tx).await?;
    tracing::info!(state = %state, "feed started");

    let event_handle = tokio::spawn(handle_events(event_rx));

    await_shutdown().await;

    client.disconnect();
    let _ = event_handle.await;

    tracing::info!("Market stream client stopped");
    Ok(())
}

/// Log events from the feed until the channel closes.
async fn handle_events(mut rx: mpsc::Receiver<MarketEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            MarketEvent::Connected => {
                tracing::info!("feed connected");
            }
            MarketEvent::Reconnecting { attempt } => {
                tracing::info!(attempt, "feed reconnecting");
            }
            MarketEvent::Polling => {
                tracing::warn!("feed degraded to polling");
            }
            MarketEvent::Quotes(batch) => {
                for quote in &batch {
                    tracing::info!(
                        symbol = %quote.symbol,
                        exchange = %quote.exchange,
                        last = ?quote.last,
                        bid = ?quote.bid,
                        ask = ?quote.ask,
                        "quote"
                    );
                }
            }
            MarketEvent::Error(msg) => {
                tracing::warn!(error = %msg, "feed error");
            }
            MarketEvent::Closed => {
                tracing::info!("feed closed by server");
            }
        }
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &StreamConfig) {
    tracing::info!(
        base_url = %config.endpoints.base_url,
        push_url = %config.endpoints.push_url,
        exchange = %config.endpoints.exchange,
        mode = ?config.mode,
        symbols = config.symbols.len(),
        latency = config.latency.as_str(),
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
