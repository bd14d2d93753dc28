//! REST Market Data Client
//!
//! Implements the poll transport (one-shot quote snapshots) and the
//! symbol catalog lookup over the platform's HTTP endpoints:
//!
//! - `GET /quotes?symbols=<csv>&latency=<tier>&exchange=<id>`
//! - `GET /symbols?exchange=<id>`
//!
//! Request failures map to [`TransportError::Request`]; the poll loop
//! treats them as transient and retries on the next tick.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{SnapshotSource, TransportError};
use crate::domain::quote::{LatencyTier, MarketSymbol, Quote, Symbol};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the REST client.
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Base URL of the market data API (e.g. `https://api.example.com`).
    pub base_url: String,
    /// Exchange identifier passed on every request.
    pub exchange: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RestClientConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            exchange: exchange.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    quotes: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    symbols: Vec<MarketSymbol>,
}

/// REST client for quote snapshots and the symbol catalog.
#[derive(Debug, Clone)]
pub struct RestMarketDataClient {
    http: Client,
    config: RestClientConfig,
}

impl RestMarketDataClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: RestClientConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch the instrument catalog for the configured exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot
    /// be decoded.
    pub async fn fetch_symbols(&self) -> Result<Vec<MarketSymbol>, TransportError> {
        let url = format!("{}/symbols", self.config.base_url);

        tracing::debug!(url = %url, exchange = %self.config.exchange, "fetching symbol catalog");

        let response = self
            .http
            .get(&url)
            .query(&[("exchange", self.config.exchange.as_str())])
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Request(format!(
                "symbol catalog returned status {}",
                response.status()
            )));
        }

        let body: SymbolsResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(body.symbols)
    }
}

#[async_trait]
impl SnapshotSource for RestMarketDataClient {
    async fn fetch_quotes(
        &self,
        symbols: &[Symbol],
        latency: LatencyTier,
    ) -> Result<Vec<Quote>, TransportError> {
        let url = format!("{}/quotes", self.config.base_url);
        let csv = symbols.join(",");

        tracing::debug!(
            url = %url,
            symbols = %csv,
            latency = latency.as_str(),
            "fetching quote snapshot"
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("symbols", csv.as_str()),
                ("latency", latency.as_str()),
                ("exchange", self.config.exchange.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Request(format!(
                "quote snapshot returned status {}",
                response.status()
            )));
        }

        let body: QuotesResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        Ok(body.quotes)
    }
}
