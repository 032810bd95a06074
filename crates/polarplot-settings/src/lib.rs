//! Polarplot Settings Crate
//!
//! Handles application configuration: typed sections, JSON/TOML files in
//! the platform config directory, and validation.

pub mod config;
pub mod error;

pub use config::{ApiSettings, Config, ConsoleSettings, PreviewSettings, StreamSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
