//! Client Configuration Settings
//!
//! Configuration types for the streaming client, loaded from
//! environment variables.

use std::time::Duration;

use crate::application::client::reconnect::ReconnectConfig;
use crate::application::client::{ClientSettings, TransportMode};
use crate::domain::quote::{LatencyTier, Symbol};

/// Endpoint locations.
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    /// Base URL of the market data HTTP API.
    pub base_url: String,
    /// Push (WebSocket) endpoint URL.
    pub push_url: String,
    /// Exchange identifier passed on catalog and snapshot requests.
    pub exchange: String,
}

/// Push connection settings.
#[derive(Debug, Clone)]
pub struct PushSettings {
    /// Base reconnection delay.
    pub reconnect_delay_base: Duration,
    /// Maximum reconnection delay.
    pub reconnect_delay_max: Duration,
    /// Reconnection delay multiplier for exponential backoff.
    pub reconnect_delay_multiplier: f64,
    /// Maximum reconnection attempts before degrading to polling.
    pub max_reconnect_attempts: u32,
}

impl Default for PushSettings {
    fn default() -> Self {
        let reconnect = ReconnectConfig::default();
        Self {
            reconnect_delay_base: reconnect.base_delay,
            reconnect_delay_max: reconnect.max_delay,
            reconnect_delay_multiplier: reconnect.multiplier,
            max_reconnect_attempts: reconnect.max_attempts,
        }
    }
}

impl PushSettings {
    /// Convert to a [`ReconnectConfig`] (default jitter).
    #[must_use]
    pub fn reconnect_config(&self) -> ReconnectConfig {
        ReconnectConfig {
            base_delay: self.reconnect_delay_base,
            max_delay: self.reconnect_delay_max,
            multiplier: self.reconnect_delay_multiplier,
            max_attempts: self.max_reconnect_attempts,
            ..ReconnectConfig::default()
        }
    }
}

/// Poll loop settings.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Interval when degraded from a failed push transport.
    pub degraded_interval: Duration,
    /// Interval for a poll-only client.
    pub passive_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            degraded_interval: Duration::from_secs(5),
            passive_interval: Duration::from_secs(30),
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Endpoint locations.
    pub endpoints: EndpointSettings,
    /// Push connection settings.
    pub push: PushSettings,
    /// Poll loop settings.
    pub poll: PollSettings,
    /// Transport selection.
    pub mode: TransportMode,
    /// Symbols to subscribe at startup.
    pub symbols: Vec<Symbol>,
    /// Latency tier for the startup subscription.
    pub latency: LatencyTier,
}

impl StreamConfig {
    /// Create configuration from environment variables.
    ///
    /// `MARKET_STREAM_BASE_URL` is required; everything else has a
    /// default. When `MARKET_STREAM_PUSH_URL` is unset the push
    /// endpoint is derived from the base URL by swapping the scheme
    /// to `ws(s)` and appending `/stream`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is missing
    /// or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("MARKET_STREAM_BASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("MARKET_STREAM_BASE_URL".to_string()))?;
        if base_url.is_empty() {
            return Err(ConfigError::EmptyValue("MARKET_STREAM_BASE_URL".to_string()));
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let push_url = std::env::var("MARKET_STREAM_PUSH_URL")
            .unwrap_or_else(|_| derive_push_url(&base_url));

        let exchange =
            std::env::var("MARKET_STREAM_EXCHANGE").unwrap_or_else(|_| "CBOT".to_string());

        let push = PushSettings {
            reconnect_delay_base: parse_env_duration_millis(
                "MARKET_STREAM_RECONNECT_DELAY_BASE_MS",
                PushSettings::default().reconnect_delay_base,
            ),
            reconnect_delay_max: parse_env_duration_secs(
                "MARKET_STREAM_RECONNECT_DELAY_MAX_SECS",
                PushSettings::default().reconnect_delay_max,
            ),
            reconnect_delay_multiplier: parse_env_f64(
                "MARKET_STREAM_RECONNECT_DELAY_MULTIPLIER",
                PushSettings::default().reconnect_delay_multiplier,
            ),
            max_reconnect_attempts: parse_env_u32(
                "MARKET_STREAM_MAX_RECONNECT_ATTEMPTS",
                PushSettings::default().max_reconnect_attempts,
            ),
        };

        let poll = PollSettings {
            degraded_interval: parse_env_duration_secs(
                "MARKET_STREAM_POLL_INTERVAL_SECS",
                PollSettings::default().degraded_interval,
            ),
            passive_interval: parse_env_duration_secs(
                "MARKET_STREAM_PASSIVE_POLL_INTERVAL_SECS",
                PollSettings::default().passive_interval,
            ),
        };

        let mode = std::env::var("MARKET_STREAM_MODE")
            .map(|s| TransportMode::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let symbols = std::env::var("MARKET_STREAM_SYMBOLS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let latency = std::env::var("MARKET_STREAM_LATENCY")
            .map(|s| LatencyTier::from_str_case_insensitive(&s))
            .unwrap_or_default();

        Ok(Self {
            endpoints: EndpointSettings {
                base_url,
                push_url,
                exchange,
            },
            push,
            poll,
            mode,
            symbols,
            latency,
        })
    }

    /// Build the client settings from this configuration.
    #[must_use]
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            reconnect: self.push.reconnect_config(),
            degraded_poll_interval: self.poll.degraded_interval,
            passive_poll_interval: self.poll.passive_interval,
            mode: self.mode,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

/// Derive the push URL from the HTTP base URL (same origin, `/stream`).
fn derive_push_url(base_url: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };
    format!("{ws_base}/stream")
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
