//! In-memory stand-ins for the backend

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use polarplot_communication::{DeviceApi, EventStream, StreamConnector};
use polarplot_core::{ApiError, ConnectionError, LogEntry, PortInfo};
use tokio::sync::mpsc;

/// Connector whose streams are fed by the test
#[derive(Default)]
pub struct ChannelConnector {
    attempts: AtomicUsize,
    refuse: AtomicBool,
    feeds: Mutex<Vec<Option<mpsc::UnboundedSender<String>>>>,
}

impl ChannelConnector {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make subsequent connection attempts fail
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Deliver `text` on the newest open stream
    pub fn push(&self, text: impl Into<String>) {
        let feeds = self.feeds.lock().unwrap();
        let feed = feeds
            .iter()
            .rev()
            .flatten()
            .next()
            .expect("no open stream");
        feed.send(text.into()).expect("stream task gone");
    }

    /// Close the newest open stream
    pub fn close_latest(&self) {
        let mut feeds = self.feeds.lock().unwrap();
        if let Some(slot) = feeds.iter_mut().rev().find(|f| f.is_some()) {
            *slot = None;
        }
    }
}

struct ChannelStream {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl EventStream for ChannelStream {
    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>> {
        self.rx.recv().await.map(Ok)
    }
}

#[async_trait]
impl StreamConnector for ChannelConnector {
    async fn connect(&self) -> Result<Box<dyn EventStream>, ConnectionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ConnectionError::FailedToOpen {
                url: "ws://fake/ws".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().unwrap().push(Some(tx));
        Ok(Box::new(ChannelStream { rx }))
    }
}

pub fn gcode_response(entry: &LogEntry) -> String {
    serde_json::json!({
        "type": "gcode_response",
        "timestamp": entry.timestamp,
        "command": entry.command,
        "response": entry.response,
    })
    .to_string()
}

/// Device API answering every command with a fixed timestamp
pub struct FakeDeviceApi {
    pub timestamp: String,
    pub fail_with: Option<ApiError>,
    pub sent: Mutex<Vec<String>>,
}

impl FakeDeviceApi {
    pub fn new(timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            fail_with: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new("")
        }
    }

    fn outcome(&self) -> Result<(), ApiError> {
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeviceApi for FakeDeviceApi {
    async fn connect(&self, _port: &str) -> Result<(), ApiError> {
        self.outcome()
    }

    async fn disconnect(&self) -> Result<(), ApiError> {
        self.outcome()
    }

    async fn list_ports(&self) -> Result<Vec<PortInfo>, ApiError> {
        self.outcome().map(|_| Vec::new())
    }

    async fn fetch_log(&self) -> Result<Vec<LogEntry>, ApiError> {
        self.outcome().map(|_| Vec::new())
    }

    async fn clear_log(&self) -> Result<(), ApiError> {
        self.outcome()
    }

    async fn send_command(&self, command: &str) -> Result<LogEntry, ApiError> {
        self.sent.lock().unwrap().push(command.to_string());
        self.outcome()?;
        Ok(LogEntry::new(self.timestamp.clone(), command, "ok"))
    }

    async fn run_file(&self, _project_id: &str, _file_name: &str) -> Result<(), ApiError> {
        self.outcome()
    }

    async fn stop(&self) -> Result<(), ApiError> {
        self.outcome()
    }

    async fn toggle_pause(&self) -> Result<(), ApiError> {
        self.outcome()
    }
}
