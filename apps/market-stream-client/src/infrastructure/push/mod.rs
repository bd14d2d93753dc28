//! WebSocket Push Transport
//!
//! Implements the push ports over a WebSocket connection to the quote
//! stream endpoint. Control messages (subscribe/unsubscribe
//! announcements) go out as JSON text; quote frames come back the
//! same way. Server pings are answered inline; close frames are
//! classified clean or unclean by their close code so the client can
//! tell a deliberate shutdown from a connection loss.

pub mod codec;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::application::ports::{PushEvent, PushSession, PushTransport, TransportError};
use crate::domain::subscription::Announcement;

use codec::JsonCodec;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket implementation of [`PushTransport`].
#[derive(Debug, Clone)]
pub struct WebSocketPushTransport {
    url: String,
    codec: JsonCodec,
}

impl WebSocketPushTransport {
    /// Create a transport for the given `ws://` or `wss://` URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            codec: JsonCodec::new(),
        }
    }

    /// The endpoint URL this transport connects to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PushTransport for WebSocketPushTransport {
    async fn open(&self) -> Result<Box<dyn PushSession>, TransportError> {
        if self.url.is_empty() {
            return Err(TransportError::Unsupported(
                "no push endpoint configured".to_string(),
            ));
        }

        tracing::info!(url = %self.url, "opening push connection");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.url)
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let (write, read) = ws_stream.split();

        Ok(Box::new(WebSocketPushSession {
            write,
            read,
            codec: self.codec.clone(),
            closed: false,
        }))
    }
}

/// An open WebSocket push session.
pub struct WebSocketPushSession {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    codec: JsonCodec,
    closed: bool,
}

#[async_trait]
impl PushSession for WebSocketPushSession {
    async fn announce(&mut self, announcement: &Announcement) -> Result<(), TransportError> {
        let json = self
            .codec
            .encode_announcement(announcement)
            .map_err(|e| TransportError::Send(e.to_string()))?;

        tracing::debug!(
            op = ?announcement.op,
            symbols = announcement.symbols.len(),
            "sending announcement"
        );

        self.write
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn next_event(&mut self) -> PushEvent {
        if self.closed {
            return PushEvent::Closed { clean: true };
        }

        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => match self.codec.decode_frame(text.as_str()) {
                    Ok(quotes) => return PushEvent::Quotes(quotes),
                    Err(e) => return PushEvent::Error(e.to_string()),
                },
                Some(Ok(Message::Ping(data))) => {
                    let _ = self.write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    let clean = frame.is_none_or(|f| f.code == CloseCode::Normal);
                    self.closed = true;
                    return PushEvent::Closed { clean };
                }
                Some(Ok(_)) => {
                    // Binary and pong frames are not part of the protocol
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "websocket read error");
                    self.closed = true;
                    return PushEvent::Closed { clean: false };
                }
                None => {
                    self.closed = true;
                    return PushEvent::Closed { clean: false };
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.write.send(Message::Close(None)).await;
        let _ = self.write.close().await;
    }
}
