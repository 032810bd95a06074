//! HTTP implementation of [`DeviceApi`].

use std::time::Duration;

use async_trait::async_trait;
use polarplot_core::{ApiError, LogEntry, PortInfo};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, trace};

use super::DeviceApi;

/// JSON-over-HTTP client for the plotter backend.
///
/// Endpoint paths are relative to the configured base URL, e.g.
/// `http://localhost:8000/api`.
#[derive(Debug, Clone)]
pub struct HttpDeviceApi {
    client: Client,
    base_url: String,
}

impl HttpDeviceApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }

        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                endpoint: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, path: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        trace!("Request {}", path);
        let response = request.send().await.map_err(|e| ApiError::Transport {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default();
        debug!("{} returned {}: {}", path, status, message);
        Err(ApiError::Status {
            endpoint: path.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(path, self.client.get(self.url(path))).await?;
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Response, ApiError> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.execute(path, request).await
    }
}

/// Pull a readable message out of an error body.
///
/// The backend reports failures as `{"detail": "..."}`; anything else is
/// passed through as trimmed text.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_string()),
        },
        _ => Some(body.to_string()),
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceApi {
    async fn connect(&self, port: &str) -> Result<(), ApiError> {
        self.post("/plotter/connect", Some(json!({ "port": port })))
            .await
            .map(|_| ())
    }

    async fn disconnect(&self) -> Result<(), ApiError> {
        self.post("/plotter/disconnect", None).await.map(|_| ())
    }

    async fn list_ports(&self) -> Result<Vec<PortInfo>, ApiError> {
        self.get_json("/plotter/ports").await
    }

    async fn fetch_log(&self) -> Result<Vec<LogEntry>, ApiError> {
        self.get_json("/plotter/log").await
    }

    async fn clear_log(&self) -> Result<(), ApiError> {
        let path = "/plotter/log";
        self.execute(path, self.client.delete(self.url(path)))
            .await
            .map(|_| ())
    }

    async fn send_command(&self, command: &str) -> Result<LogEntry, ApiError> {
        let path = "/plotter/command";
        let response = self
            .post(path, Some(json!({ "command": command })))
            .await?;
        response.json::<LogEntry>().await.map_err(|e| ApiError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn run_file(&self, project_id: &str, file_name: &str) -> Result<(), ApiError> {
        let path = format!("/projects/{}/run", project_id);
        self.post(&path, Some(json!({ "file_name": file_name })))
            .await
            .map(|_| ())
    }

    async fn stop(&self) -> Result<(), ApiError> {
        self.post("/plotter/stop", None).await.map(|_| ())
    }

    async fn toggle_pause(&self) -> Result<(), ApiError> {
        self.post("/plotter/pause", None).await.map(|_| ())
    }
}
