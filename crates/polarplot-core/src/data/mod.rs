//! Data models shared with the plotter backend
//!
//! This module provides:
//! - Session log entries and their dedup key
//! - Event stream connection state
//! - Paper sizes used to frame the preview
//! - Serial port descriptions returned by the backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// One command/response exchange with the device.
///
/// Entries are append-only and identified by the
/// `(timestamp, command, response)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp assigned by the backend
    pub timestamp: String,
    /// Command text as sent to the device
    pub command: String,
    /// Raw device response
    pub response: String,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(
        timestamp: impl Into<String>,
        command: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            command: command.into(),
            response: response.into(),
        }
    }

    /// Key identifying this entry regardless of how it was delivered.
    pub fn dedup_key(&self) -> String {
        format!("{}-{}-{}", self.timestamp, self.command, self.response)
    }
}

/// Producer that delivered a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOrigin {
    /// Pushed by the device-event stream
    Stream,
    /// Returned synchronously by a locally dispatched command
    LocalEcho,
}

impl fmt::Display for EntryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => write!(f, "stream"),
            Self::LocalEcho => write!(f, "local echo"),
        }
    }
}

/// Event stream connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No stream is open
    #[default]
    Disconnected,
    /// A connection attempt is outstanding
    Connecting,
    /// The stream is open and delivering events
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// A sheet of paper placed on the plotter, in millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Display name
    pub name: String,
    /// Sheet width in mm
    pub width_mm: f64,
    /// Sheet height in mm
    pub height_mm: f64,
}

impl Paper {
    /// Create a new paper size
    pub fn new(name: impl Into<String>, width_mm: f64, height_mm: f64) -> Self {
        Self {
            name: name.into(),
            width_mm,
            height_mm,
        }
    }

    /// Standard portrait sizes
    pub fn standard_sizes() -> Vec<Paper> {
        vec![
            Paper::new("A5", 148.0, 210.0),
            Paper::new("A4", 210.0, 297.0),
            Paper::new("A3", 297.0, 420.0),
            Paper::new("Letter", 215.9, 279.4),
        ]
    }

    /// Look up a standard size by name (case-insensitive)
    pub fn by_name(name: &str) -> Option<Paper> {
        Self::standard_sizes()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Same sheet turned 90 degrees
    pub fn landscape(&self) -> Paper {
        Paper::new(self.name.clone(), self.height_mm, self.width_mm)
    }

    /// Half extents of the sheet, which is centered on the plotter origin
    pub fn half_extents(&self) -> (f64, f64) {
        (self.width_mm / 2.0, self.height_mm / 2.0)
    }
}

impl fmt::Display for Paper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} x {} mm)",
            self.name, self.width_mm, self.height_mm
        )
    }
}

/// Serial port reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    /// Device path (e.g., "/dev/ttyUSB0", "COM3")
    pub device: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}
