use std::sync::Arc;

use polarplot_core::{ApiError, AppEvent, EventBus, LogEntry, SessionEvent};
use tracing::{debug, error};

use super::client::EchoSender;
use crate::api::DeviceApi;

/// Sends operator commands and echoes each result into the session log.
///
/// The echo is merged with the same dedup key the stream uses, so the
/// stream's later copy of the same exchange is dropped and a copy the
/// stream never delivers is still logged. Failures are returned to the
/// caller as-is; nothing is retried.
#[derive(Clone)]
pub struct CommandDispatcher {
    api: Arc<dyn DeviceApi>,
    echo: EchoSender,
    bus: Option<Arc<EventBus>>,
}

impl CommandDispatcher {
    pub fn new(api: Arc<dyn DeviceApi>, echo: EchoSender) -> Self {
        Self {
            api,
            echo,
            bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub async fn send(&self, command: &str) -> Result<LogEntry, ApiError> {
        debug!("Dispatching command '{}'", command);
        match self.api.send_command(command).await {
            Ok(entry) => {
                if !self.echo.echo(entry.clone()) {
                    debug!("Session closed, local echo dropped");
                }
                Ok(entry)
            }
            Err(e) => {
                error!("Command '{}' failed: {}", command, e);
                if let Some(bus) = &self.bus {
                    bus.publish(AppEvent::Session(SessionEvent::CommandFailed {
                        command: command.to_string(),
                        message: e.to_string(),
                    }));
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("event_bus", &self.bus.is_some())
            .finish()
    }
}
