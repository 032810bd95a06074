//! # Polarplot
//!
//! Terminal front end for a polargraph pen plotter:
//! - Headless G-code preview rendered to SVG, with paper outline and pan/zoom
//! - Live session console fed by the backend's event stream and local echoes
//! - One-shot device operations (ports, connect, run, stop, pause)
//!
//! ## Architecture
//!
//! Polarplot is organized as a workspace with multiple crates:
//!
//! 1. **polarplot-core** - Constants, shared data, errors, event bus
//! 2. **polarplot-visualizer** - G-code parser, projector, renderer, surfaces
//! 3. **polarplot-communication** - REST device API, event stream, session log
//! 4. **polarplot-ui** - Console panel view model
//! 5. **polarplot-settings** - Configuration files and validation
//! 6. **polarplot** - This binary, which wires the crates together

pub mod cli;
pub mod console;
pub mod preview;

pub use polarplot_communication::{CommandDispatcher, DeviceApi, HttpDeviceApi, SessionLogClient};
pub use polarplot_core::{ConnectionState, Error, EventBus, LogEntry, Paper, Result};
pub use polarplot_settings::Config;
pub use polarplot_ui::ConsolePanel;
pub use polarplot_visualizer::{GcodeParser, PlotRenderer, PreviewState, SvgSurface};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Filter built from `RUST_LOG`-style directives, INFO when unset or invalid
fn log_filter(directives: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so stdout stays usable for command output
/// - RUST_LOG environment variable support, INFO by default
/// - Pretty or JSON formatting
pub fn init_logging(format: LogFormat) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    match format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_honours_directives() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            log_filter(Some("warn,polarplot_communication=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
        assert_eq!(log_filter(Some("error")).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("polarplot=notalevel")).max_level_hint(),
            Some(LevelFilter::INFO)
        );
    }
}
