//! Device event stream
//!
//! The backend pushes JSON messages over a WebSocket. Only messages with
//! `"type": "gcode_response"` concern the session log; everything else is
//! owned by other features and skipped here.

use async_trait::async_trait;
use futures::StreamExt;
use polarplot_core::constants::GCODE_RESPONSE_TYPE;
use polarplot_core::{ConnectionError, LogEntry, StreamError};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::http::Uri;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

/// Opens event streams. One call per connection attempt.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn EventStream>, ConnectionError>;
}

/// An open event stream yielding text payloads in arrival order.
#[async_trait]
pub trait EventStream: Send {
    /// Next payload; `None` once the stream has closed cleanly
    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>>;
}

/// Decode one stream payload.
///
/// Returns `Ok(None)` for well-formed messages of other types.
pub fn parse_stream_message(text: &str) -> Result<Option<LogEntry>, StreamError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| StreamError::MalformedPayload {
            reason: e.to_string(),
        })?;

    let message_type = match value.get("type") {
        Some(Value::String(t)) => t.as_str(),
        Some(_) | None => {
            return Err(StreamError::MalformedPayload {
                reason: "missing message type".to_string(),
            })
        }
    };

    if message_type != GCODE_RESPONSE_TYPE {
        return Ok(None);
    }

    serde_json::from_value::<LogEntry>(value)
        .map(Some)
        .map_err(|e| StreamError::InvalidMessage {
            message_type: GCODE_RESPONSE_TYPE.to_string(),
            reason: e.to_string(),
        })
}

/// Connects to the backend's WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    pub fn new(url: &str) -> Result<Self, ConnectionError> {
        let invalid = || ConnectionError::InvalidUrl {
            url: url.to_string(),
        };
        let uri: Uri = url.parse().map_err(|_| invalid())?;
        match uri.scheme_str() {
            Some("ws") | Some("wss") if uri.host().is_some() => Ok(Self {
                url: url.to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StreamConnector for WebSocketConnector {
    async fn connect(&self) -> Result<Box<dyn EventStream>, ConnectionError> {
        debug!("Opening event stream {}", self.url);
        let (socket, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| ConnectionError::FailedToOpen {
                    url: self.url.clone(),
                    reason: e.to_string(),
                })?;
        Ok(Box::new(WebSocketEventStream { socket }))
    }
}

struct WebSocketEventStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl EventStream for WebSocketEventStream {
    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>> {
        loop {
            let message = match self.socket.next().await? {
                Ok(message) => message,
                Err(e) => {
                    return Some(Err(ConnectionError::WebSocketError {
                        reason: e.to_string(),
                    }))
                }
            };

            match message {
                Message::Text(text) => return Some(Ok(text.as_str().to_owned())),
                Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => trace!("Skipping non-UTF-8 binary frame"),
                },
                Message::Close(frame) => {
                    debug!("Event stream closed by peer: {:?}", frame);
                    return None;
                }
                // Pings are answered by tungstenite itself
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}
