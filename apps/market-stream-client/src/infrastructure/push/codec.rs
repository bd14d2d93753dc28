//! Push Stream Codec
//!
//! JSON encoding and decoding for the push channel wire format.
//!
//! Inbound frames carry quote batches:
//!
//! ```json
//! {"quotes": [{"symbol": "ZCZ5", "exchange": "CBOT", ...}]}
//! ```
//!
//! Outbound control messages are [`Announcement`]s:
//!
//! ```json
//! {"op": "sub", "symbols": ["ZCZ5"], "latency": "realtime"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::quote::Quote;
use crate::domain::subscription::Announcement;

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encoding/decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is not a recognized frame.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

/// A quote-batch frame as sent by the push endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteFrame {
    /// The quotes in this frame.
    pub quotes: Vec<Quote>,
}

/// JSON codec for push frames and control messages.
#[derive(Debug, Default, Clone)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode an inbound text payload into a quote batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a JSON object with a
    /// `quotes` array.
    pub fn decode_frame(&self, text: &str) -> Result<Vec<Quote>, CodecError> {
        let trimmed = text.trim();

        if !trimmed.starts_with('{') {
            let preview: String = trimmed.chars().take(50).collect();
            return Err(CodecError::InvalidFrame(format!(
                "expected JSON object, got: {preview}..."
            )));
        }

        let frame: QuoteFrame = serde_json::from_str(trimmed)?;
        Ok(frame.quotes)
    }

    /// Encode an announcement as a control message.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode_announcement(&self, announcement: &Announcement) -> Result<String, CodecError> {
        Ok(serde_json::to_string(announcement)?)
    }
}
