//! Event type definitions for the event bus.
//!
//! Events are organized by category. Preview events tell the render
//! pipeline that its inputs changed; session events describe the device
//! log and its connection.

use serde::{Deserialize, Serialize};

use crate::data::{ConnectionState, EntryOrigin, LogEntry};

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Preview inputs changed
    Preview(PreviewEvent),
    /// Device session log and connection
    Session(SessionEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Preview(_) => EventCategory::Preview,
            AppEvent::Session(_) => EventCategory::Session,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Preview(e) => e.description(),
            AppEvent::Session(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Preview pipeline events.
    Preview,
    /// Session log events.
    Session,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Preview => write!(f, "Preview"),
            EventCategory::Session => write!(f, "Session"),
        }
    }
}

/// Preview pipeline events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PreviewEvent {
    /// G-code source was reparsed.
    SourceChanged {
        /// Number of motion segments after the reparse.
        segment_count: usize,
    },
    /// Zoom or pan changed.
    ViewChanged {
        /// New zoom factor.
        zoom: f64,
        /// New horizontal pan in pixels.
        pan_x: f64,
        /// New vertical pan in pixels.
        pan_y: f64,
    },
    /// Paper selection changed.
    PaperChanged {
        /// Selected paper name, if any.
        paper: Option<String>,
    },
    /// Render surface size changed.
    ViewportResized {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
}

impl PreviewEvent {
    /// Get a short description
    pub fn description(&self) -> String {
        match self {
            PreviewEvent::SourceChanged { segment_count } => {
                format!("Source changed ({} segments)", segment_count)
            }
            PreviewEvent::ViewChanged { zoom, pan_x, pan_y } => {
                format!("View changed (zoom {:.2}, pan {:.1},{:.1})", zoom, pan_x, pan_y)
            }
            PreviewEvent::PaperChanged { paper } => match paper {
                Some(name) => format!("Paper set to {}", name),
                None => "Paper cleared".to_string(),
            },
            PreviewEvent::ViewportResized { width, height } => {
                format!("Viewport resized to {}x{}", width, height)
            }
        }
    }
}

/// Session log events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Stream connection state changed.
    StateChanged(ConnectionState),
    /// A new entry was appended to the log.
    EntryAppended {
        /// The appended entry.
        entry: LogEntry,
        /// Which producer delivered it first.
        origin: EntryOrigin,
    },
    /// The log was replaced by a full reload.
    LogReloaded {
        /// Number of entries after the reload.
        count: usize,
    },
    /// The log was cleared.
    LogCleared,
    /// A dispatched command failed.
    CommandFailed {
        /// Command text.
        command: String,
        /// Error shown to the operator.
        message: String,
    },
}

impl SessionEvent {
    /// Get a short description
    pub fn description(&self) -> String {
        match self {
            SessionEvent::StateChanged(state) => format!("Stream {}", state),
            SessionEvent::EntryAppended { entry, origin } => {
                format!("Entry '{}' appended via {}", entry.command, origin)
            }
            SessionEvent::LogReloaded { count } => format!("Log reloaded ({} entries)", count),
            SessionEvent::LogCleared => "Log cleared".to_string(),
            SessionEvent::CommandFailed { command, message } => {
                format!("Command '{}' failed: {}", command, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_category() {
        let event = AppEvent::Preview(PreviewEvent::SourceChanged { segment_count: 3 });
        assert_eq!(event.category(), EventCategory::Preview);

        let event = AppEvent::Session(SessionEvent::LogCleared);
        assert_eq!(event.category(), EventCategory::Session);
    }

    #[test]
    fn test_event_description() {
        let event = AppEvent::Session(SessionEvent::EntryAppended {
            entry: LogEntry::new("t", "G28", "ok"),
            origin: EntryOrigin::LocalEcho,
        });
        assert_eq!(event.description(), "Entry 'G28' appended via local echo");
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Session(SessionEvent::StateChanged(ConnectionState::Connected));
        let json = serde_json::to_string(&event).expect("event should serialize");
        let back: AppEvent = serde_json::from_str(&json).expect("event should deserialize");
        assert_eq!(back, event);
    }
}
