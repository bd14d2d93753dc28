//! Market Data Value Types
//!
//! Canonical quote and symbol types shared by the push and poll
//! transports. A [`Quote`] is an immutable value produced by the
//! server; the client batches and forwards quotes without mutating
//! or filtering them.
//!
//! # Wire Format (JSON)
//!
//! ```json
//! {
//!   "symbol": "ZCZ5",
//!   "exchange": "CBOT",
//!   "timestamp": "2026-08-21T14:30:00Z",
//!   "last": "452.25",
//!   "bid": "452.00",
//!   "ask": "452.50",
//!   "unit": "bushel",
//!   "currency": "USD"
//! }
//! ```
//!
//! All price fields are optional: an end-of-day quote may carry only
//! `last` and the OHLC fields, while a live quote may carry only
//! `bid`/`ask`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An instrument symbol (e.g. futures code `"ZCZ5"` or pair `"XAU/USD"`).
pub type Symbol = String;

// =============================================================================
// Latency Tier
// =============================================================================

/// Data latency tier attached to subscribe and poll requests.
///
/// Not itself stateful; threaded through requests as an input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyTier {
    /// Real-time quotes.
    #[default]
    Realtime,
    /// Quotes delayed by 15 minutes.
    Delayed15,
    /// End-of-day quotes.
    Eod,
}

impl LatencyTier {
    /// Parse a tier from a string, defaulting to `Realtime`.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "delayed15" => Self::Delayed15,
            "eod" => Self::Eod,
            _ => Self::Realtime,
        }
    }

    /// Get the tier name used in request parameters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime",
            Self::Delayed15 => "delayed15",
            Self::Eod => "eod",
        }
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A single market quote for one instrument.
///
/// Numeric fields are optional because the server populates different
/// subsets depending on the latency tier and instrument type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument symbol.
    pub symbol: Symbol,

    /// Exchange identifier (e.g. "CBOT", "COMEX").
    pub exchange: String,

    /// Quote timestamp.
    pub timestamp: DateTime<Utc>,

    /// Last traded price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<Decimal>,

    /// Best bid price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,

    /// Best ask price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,

    /// Mark price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<Decimal>,

    /// Session open price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    /// Session high price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// Session low price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Session volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Unit the price is quoted in (e.g. "bushel", "troy oz").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Quote currency (e.g. "USD").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

// =============================================================================
// Market Symbol (catalog entry)
// =============================================================================

/// A catalog entry describing a tradeable instrument.
///
/// Returned by the symbol catalog endpoint; used by embedding
/// applications to discover what can be subscribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSymbol {
    /// Instrument symbol.
    pub symbol: Symbol,

    /// Human-readable description (e.g. "Corn Dec 2025").
    pub description: String,

    /// Exchange identifier.
    pub exchange: String,

    /// Unit the instrument is quoted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Quote currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("realtime", LatencyTier::Realtime)]
    #[test_case("REALTIME", LatencyTier::Realtime ; "uppercase realtime")]
    #[test_case("delayed15", LatencyTier::Delayed15)]
    #[test_case("Delayed15", LatencyTier::Delayed15 ; "mixed case delayed15")]
    #[test_case("eod", LatencyTier::Eod)]
    #[test_case("unknown", LatencyTier::Realtime)]
    fn latency_tier_parsing(input: &str, expected: LatencyTier) {
        assert_eq!(LatencyTier::from_str_case_insensitive(input), expected);
    }

    #[test]
    fn latency_tier_wire_names() {
        assert_eq!(LatencyTier::Realtime.as_str(), "realtime");
        assert_eq!(LatencyTier::Delayed15.as_str(), "delayed15");
        assert_eq!(LatencyTier::Eod.as_str(), "eod");
    }

    #[test]
    fn latency_tier_serde_roundtrip() {
        let json = serde_json::to_string(&LatencyTier::Delayed15).unwrap();
        assert_eq!(json, "\"delayed15\"");
        let tier: LatencyTier = serde_json::from_str(&json).unwrap();
        assert_eq!(tier, LatencyTier::Delayed15);
    }

    #[test]
    fn quote_deserializes_with_partial_fields() {
        let json = r#"{
            "symbol": "GCZ5",
            "exchange": "COMEX",
            "timestamp": "2026-08-21T14:30:00Z",
            "bid": "2412.10",
            "ask": "2412.40",
            "unit": "troy oz",
            "currency": "USD"
        }"#;

        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.symbol, "GCZ5");
        assert_eq!(quote.exchange, "COMEX");
        assert_eq!(quote.bid, Some(Decimal::new(241_210, 2)));
        assert_eq!(quote.ask, Some(Decimal::new(241_240, 2)));
        assert!(quote.last.is_none());
        assert!(quote.volume.is_none());
        assert_eq!(quote.unit.as_deref(), Some("troy oz"));
    }

    #[test]
    fn quote_serialization_omits_missing_fields() {
        let quote = Quote {
            symbol: "ZCZ5".to_string(),
            exchange: "CBOT".to_string(),
            timestamp: Utc::now(),
            last: Some(Decimal::new(45_225, 2)),
            bid: None,
            ask: None,
            mark: None,
            open: None,
            high: None,
            low: None,
            volume: None,
            unit: None,
            currency: None,
        };

        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"last\""));
        assert!(!json.contains("\"bid\""));
        assert!(!json.contains("\"volume\""));
    }

    #[test]
    fn market_symbol_roundtrip() {
        let symbol = MarketSymbol {
            symbol: "ZWZ5".to_string(),
            description: "Wheat Dec 2025".to_string(),
            exchange: "CBOT".to_string(),
            unit: Some("bushel".to_string()),
            currency: Some("USD".to_string()),
        };

        let json = serde_json::to_string(&symbol).unwrap();
        let parsed: MarketSymbol = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, symbol);
    }
}
