//! # Polarplot Core
//!
//! Core types, errors, and the event bus shared by the Polarplot crates.
//! Provides the data shapes exchanged with the plotter backend and the
//! publish/subscribe plumbing that carries state change notifications.

pub mod constants;
pub mod data;
pub mod error;
pub mod event_bus;

pub use data::{ConnectionState, EntryOrigin, LogEntry, Paper, PortInfo};

pub use error::{ApiError, ConnectionError, Error, Result, StreamError};

pub use event_bus::{
    AppEvent, EventBus, EventCategory, EventFilter, PreviewEvent, SessionEvent, SubscriptionId,
};
