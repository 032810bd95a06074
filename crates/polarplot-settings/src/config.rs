//! Configuration and settings management for Polarplot
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Device API (base URL, request timeout)
//! - Event stream (URL, reconnect delay, dedup window)
//! - Preview (canvas size, padding, default paper)
//! - Console (page size, response preview length, scroll follow)

use std::path::{Path, PathBuf};
use std::time::Duration;

use polarplot_core::constants::{
    CANVAS_PADDING_PX, FOLLOW_THRESHOLD_PX, LOG_PAGE_SIZE, RECONNECT_DELAY_MS,
    RESPONSE_PREVIEW_CHARS, SEEN_KEY_CAPACITY,
};
use polarplot_core::Paper;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Device REST API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL all endpoint paths are appended to
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Device event stream settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// WebSocket endpoint
    pub url: String,
    /// Delay before reconnecting a dropped stream, in milliseconds
    pub reconnect_delay_ms: u64,
    /// Number of recent entries remembered for deduplication
    pub seen_key_capacity: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/ws".to_string(),
            reconnect_delay_ms: RECONNECT_DELAY_MS,
            seen_key_capacity: SEEN_KEY_CAPACITY,
        }
    }
}

impl StreamSettings {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Plot preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Canvas width in pixels
    pub canvas_width: u32,
    /// Canvas height in pixels
    pub canvas_height: u32,
    /// Space kept free around the drawing, in pixels
    pub padding_px: f64,
    /// Paper outline shown when none is chosen explicitly
    pub default_paper: Option<String>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 600,
            padding_px: CANVAS_PADDING_PX,
            default_paper: None,
        }
    }
}

impl PreviewSettings {
    /// Resolve `default_paper` against the paper catalogue
    pub fn paper(&self) -> ConfigResult<Option<Paper>> {
        match &self.default_paper {
            None => Ok(None),
            Some(name) => Paper::by_name(name)
                .map(Some)
                .ok_or_else(|| ConfigError::UnknownPaper(name.clone())),
        }
    }
}

/// Session console settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Log entries per page
    pub page_size: usize,
    /// Responses longer than this are collapsed
    pub response_preview_chars: usize,
    /// Follow new entries when within this many pixels of the bottom
    pub follow_threshold_px: f64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            page_size: LOG_PAGE_SIZE,
            response_preview_chars: RESPONSE_PREVIEW_CHARS,
            follow_threshold_px: FOLLOW_THRESHOLD_PX,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Device API settings
    pub api: ApiSettings,
    /// Event stream settings
    pub stream: StreamSettings,
    /// Preview settings
    pub preview: PreviewSettings,
    /// Console settings
    pub console: ConsoleSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn check_url(key: &str, value: &str, schemes: &[&str]) -> ConfigResult<()> {
    let invalid = || ConfigError::InvalidUrl {
        key: key.to_string(),
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid());
    }
    Ok(())
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/polarplot/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("polarplot").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` (or the default location), falling back to defaults
    /// when the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Ok(path) => path,
                Err(_) => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| SettingsError::SaveError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        check_url("api.base_url", &self.api.base_url, &["http", "https"])?;
        if self.api.timeout_ms == 0 {
            return Err(out_of_range("api.timeout_ms", self.api.timeout_ms));
        }

        check_url("stream.url", &self.stream.url, &["ws", "wss"])?;
        if self.stream.reconnect_delay_ms == 0 {
            return Err(out_of_range(
                "stream.reconnect_delay_ms",
                self.stream.reconnect_delay_ms,
            ));
        }
        if self.stream.seen_key_capacity == 0 {
            return Err(out_of_range(
                "stream.seen_key_capacity",
                self.stream.seen_key_capacity,
            ));
        }

        if self.preview.canvas_width == 0 || self.preview.canvas_height == 0 {
            return Err(out_of_range(
                "preview.canvas_size",
                format!("{}x{}", self.preview.canvas_width, self.preview.canvas_height),
            ));
        }
        if !(self.preview.padding_px >= 0.0 && self.preview.padding_px.is_finite()) {
            return Err(out_of_range("preview.padding_px", self.preview.padding_px));
        }
        self.preview.paper()?;

        if self.console.page_size == 0 {
            return Err(out_of_range("console.page_size", self.console.page_size));
        }
        if self.console.response_preview_chars == 0 {
            return Err(out_of_range(
                "console.response_preview_chars",
                self.console.response_preview_chars,
            ));
        }
        if !(self.console.follow_threshold_px >= 0.0) {
            return Err(out_of_range(
                "console.follow_threshold_px",
                self.console.follow_threshold_px,
            ));
        }

        Ok(())
    }
}
