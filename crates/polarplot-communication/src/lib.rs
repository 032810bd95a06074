//! # Polarplot Communication
//!
//! Talks to the plotter backend.
//! Provides the REST device API, the live command/response event stream,
//! the deduplicating session log fed by both, and the command dispatcher
//! that echoes results into that log.

pub mod api;
pub mod session;

pub use api::{DeviceApi, HttpDeviceApi};

pub use session::{
    parse_stream_message, CommandDispatcher, EchoSender, EventStream, SeenKeySet, SessionConfig,
    SessionLog, SessionLogClient, SessionMessage, StreamConnector, WebSocketConnector,
};
