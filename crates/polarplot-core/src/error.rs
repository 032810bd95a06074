//! Error handling for Polarplot
//!
//! Provides error types for the layers that can actually fail:
//! - Connection errors (event stream open/close, socket I/O)
//! - API errors (REST transport, status codes, body decoding)
//! - Stream errors (malformed event payloads)
//!
//! G-code parsing is total and has no error type.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents failures of the persistent device-event stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The stream endpoint could not be opened
    #[error("Failed to open stream {url}: {reason}")]
    FailedToOpen {
        /// The endpoint that failed to open.
        url: String,
        /// The reason the endpoint failed to open.
        reason: String,
    },

    /// The stream closed unexpectedly
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },

    /// Invalid endpoint URL
    #[error("Invalid stream URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// WebSocket protocol error
    #[error("WebSocket error: {reason}")]
    WebSocketError {
        /// The reason for the WebSocket error.
        reason: String,
    },

    /// The session was stopped while an operation was pending
    #[error("Session stopped")]
    Stopped,
}

/// REST API error type
///
/// Represents failures of the request/response device API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Request to {endpoint} failed: {reason}")]
    Transport {
        /// The endpoint path that was requested.
        endpoint: String,
        /// The transport failure.
        reason: String,
    },

    /// The backend answered with a non-success status
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        /// The endpoint path that was requested.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
        /// The backend's error detail, if any.
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode {
        /// The endpoint path that was requested.
        endpoint: String,
        /// The decode failure.
        reason: String,
    },

    /// The API base URL could not be parsed
    #[error("Invalid API base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },
}

/// Stream payload error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The payload is not valid JSON
    #[error("Malformed stream payload: {reason}")]
    MalformedPayload {
        /// The JSON parse failure.
        reason: String,
    },

    /// A `gcode_response` message is missing required fields
    #[error("Invalid {message_type} message: {reason}")]
    InvalidMessage {
        /// The message `type` field.
        message_type: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Main error type for Polarplot
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Stream payload error
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is an API error
    pub fn is_api_error(&self) -> bool {
        matches!(self, Error::Api(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
