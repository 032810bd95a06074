//! Request/response device API
//!
//! Everything the plotter backend does on request (port selection, command
//! execution, job control, the stored log) sits behind [`DeviceApi`] so the
//! session code and the CLI can run against a fake in tests.

pub mod http;

use async_trait::async_trait;
use polarplot_core::{ApiError, LogEntry, PortInfo};

pub use http::HttpDeviceApi;

/// Backend operations used by the console.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Open the serial connection to the plotter on `port`
    async fn connect(&self, port: &str) -> Result<(), ApiError>;

    async fn disconnect(&self) -> Result<(), ApiError>;

    async fn list_ports(&self) -> Result<Vec<PortInfo>, ApiError>;

    /// Full stored command log, oldest first
    async fn fetch_log(&self) -> Result<Vec<LogEntry>, ApiError>;

    async fn clear_log(&self) -> Result<(), ApiError>;

    /// Execute one command and return the logged result
    async fn send_command(&self, command: &str) -> Result<LogEntry, ApiError>;

    /// Start plotting a G-code file that belongs to a project
    async fn run_file(&self, project_id: &str, file_name: &str) -> Result<(), ApiError>;

    /// Halt motion
    async fn stop(&self) -> Result<(), ApiError>;

    async fn toggle_pause(&self) -> Result<(), ApiError>;
}
