//! Live session log
//!
//! This module provides:
//! - Bounded dedup key tracking (seen_keys)
//! - The ordered, deduplicated command log (log)
//! - Event stream connectors and payload decoding (stream)
//! - The reconnecting session client (client)
//! - Command dispatch with local echo (dispatcher)

pub mod client;
pub mod dispatcher;
pub mod log;
pub mod seen_keys;
pub mod stream;

pub use client::{EchoSender, SessionConfig, SessionLogClient, SessionMessage};
pub use dispatcher::CommandDispatcher;
pub use log::SessionLog;
pub use seen_keys::SeenKeySet;
pub use stream::{parse_stream_message, EventStream, StreamConnector, WebSocketConnector};
