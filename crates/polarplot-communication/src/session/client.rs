//! Session log client
//!
//! Owns the device-event stream connection and the session log. I/O runs
//! on spawned tasks that only forward what they observe as
//! [`SessionMessage`]s; the owner of the client applies those messages one
//! at a time through [`SessionLogClient::handle`], so log updates are
//! serialized and keep arrival order.
//!
//! Lifecycle: `Disconnected -> Connecting -> Connected -> Disconnected`.
//! At most one connection task and one reconnect timer exist at any time.
//! Every connection attempt gets a new generation number and messages from
//! older generations are ignored.

use std::sync::Arc;
use std::time::Duration;

use polarplot_core::constants::{RECONNECT_DELAY_MS, SEEN_KEY_CAPACITY};
use polarplot_core::{
    AppEvent, ConnectionState, EntryOrigin, EventBus, LogEntry, SessionEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::log::SessionLog;
use super::stream::{parse_stream_message, StreamConnector};

/// Work item for the session's serialized update path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    /// Connection `generation` finished its handshake
    Opened { generation: u64 },
    /// Raw payload received on connection `generation`
    Payload { generation: u64, text: String },
    /// Connection `generation` failed to open or closed
    Closed { generation: u64, reason: String },
    /// The reconnect delay elapsed
    ReconnectDue,
    /// Result of a locally dispatched command
    LocalEcho(LogEntry),
}

/// Session timing and sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub reconnect_delay: Duration,
    pub seen_key_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(RECONNECT_DELAY_MS),
            seen_key_capacity: SEEN_KEY_CAPACITY,
        }
    }
}

/// Hands locally dispatched results to the session's update path.
#[derive(Debug, Clone)]
pub struct EchoSender {
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl EchoSender {
    /// Queue `entry` for merging. Returns `false` if the client is gone.
    pub fn echo(&self, entry: LogEntry) -> bool {
        self.tx.send(SessionMessage::LocalEcho(entry)).is_ok()
    }
}

pub struct SessionLogClient {
    connector: Arc<dyn StreamConnector>,
    config: SessionConfig,
    log: SessionLog,
    state: ConnectionState,
    running: bool,
    generation: u64,
    connection: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SessionMessage>,
    rx: mpsc::UnboundedReceiver<SessionMessage>,
    bus: Option<Arc<EventBus>>,
}

impl SessionLogClient {
    pub fn new(connector: Arc<dyn StreamConnector>, config: SessionConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            connector,
            config,
            log: SessionLog::new(config.seen_key_capacity),
            state: ConnectionState::Disconnected,
            running: false,
            generation: 0,
            connection: None,
            reconnect: None,
            tx,
            rx,
            bus: None,
        }
    }

    /// Publish session events on `bus` as well as returning them
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn entries(&self) -> &[LogEntry] {
        self.log.entries()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Number of the most recent connection attempt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect.is_some()
    }

    /// Sender for the command dispatcher's local echo
    pub fn echo_sender(&self) -> EchoSender {
        EchoSender {
            tx: self.tx.clone(),
        }
    }

    /// Sender for injecting messages directly
    pub fn message_sender(&self) -> mpsc::UnboundedSender<SessionMessage> {
        self.tx.clone()
    }

    /// Begin the session and open the stream.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        info!("Session started");
        self.running = true;
        let _ = self.connect();
    }

    /// Tear down the stream and cancel any pending reconnect.
    pub fn stop(&mut self) {
        if !self.running && self.connection.is_none() && self.reconnect.is_none() {
            return;
        }
        self.running = false;
        if let Some(task) = self.connection.take() {
            task.abort();
        }
        if let Some(timer) = self.reconnect.take() {
            timer.abort();
        }
        // Anything still queued from the old connection is stale
        self.generation += 1;
        self.set_state(ConnectionState::Disconnected);
        info!("Session stopped");
    }

    /// Replace the log with a full copy, e.g. fetched from the backend.
    pub fn reload(&mut self, entries: Vec<LogEntry>) -> SessionEvent {
        self.log.replace(entries);
        debug!("Log reloaded with {} entries", self.log.len());
        let event = SessionEvent::LogReloaded {
            count: self.log.len(),
        };
        self.publish(event.clone());
        event
    }

    pub fn clear(&mut self) -> SessionEvent {
        self.log.clear();
        debug!("Log cleared");
        self.publish(SessionEvent::LogCleared);
        SessionEvent::LogCleared
    }

    /// Wait for the next message that changes the session and apply it.
    pub async fn pump(&mut self) -> Option<SessionEvent> {
        loop {
            // The client holds a sender, so the channel never closes
            let message = self.rx.recv().await?;
            if let Some(event) = self.handle(message) {
                return Some(event);
            }
        }
    }

    /// Apply every message already queued, without waiting.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            events.extend(self.handle(message));
        }
        events
    }

    /// Apply one message. Returns the resulting change, if any.
    pub fn handle(&mut self, message: SessionMessage) -> Option<SessionEvent> {
        match message {
            SessionMessage::Opened { generation } => {
                if !self.is_current(generation) {
                    return None;
                }
                self.set_state(ConnectionState::Connected)
            }
            SessionMessage::Payload { generation, text } => {
                if !self.is_current(generation) {
                    return None;
                }
                self.handle_payload(&text)
            }
            SessionMessage::Closed { generation, reason } => {
                if !self.is_current(generation) {
                    return None;
                }
                warn!("Event stream closed: {}", reason);
                self.connection = None;
                let event = self.set_state(ConnectionState::Disconnected);
                self.schedule_reconnect();
                event
            }
            SessionMessage::ReconnectDue => {
                self.reconnect = None;
                if self.running {
                    self.connect()
                } else {
                    None
                }
            }
            SessionMessage::LocalEcho(entry) => self.merge(entry, EntryOrigin::LocalEcho),
        }
    }

    fn handle_payload(&mut self, text: &str) -> Option<SessionEvent> {
        match parse_stream_message(text) {
            Ok(Some(entry)) => self.merge(entry, EntryOrigin::Stream),
            Ok(None) => {
                trace!("Ignoring stream message of another type");
                None
            }
            Err(e) => {
                warn!("Dropping stream payload: {}", e);
                None
            }
        }
    }

    fn merge(&mut self, entry: LogEntry, origin: EntryOrigin) -> Option<SessionEvent> {
        if !self.log.merge(entry.clone()) {
            return None;
        }
        let event = SessionEvent::EntryAppended { entry, origin };
        self.publish(event.clone());
        Some(event)
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            trace!("Ignoring message from stale connection {}", generation);
            return false;
        }
        true
    }

    /// Open a connection unless one is already outstanding
    fn connect(&mut self) -> Option<SessionEvent> {
        if self.state != ConnectionState::Disconnected
            || self.connection.as_ref().is_some_and(|task| !task.is_finished())
        {
            debug!("Connection already outstanding, not reconnecting");
            return None;
        }

        self.generation += 1;
        let generation = self.generation;
        let connector = Arc::clone(&self.connector);
        let tx = self.tx.clone();
        self.connection = Some(tokio::spawn(run_connection(connector, generation, tx)));
        self.set_state(ConnectionState::Connecting)
    }

    fn schedule_reconnect(&mut self) {
        if !self.running {
            return;
        }
        if self.reconnect.is_some() {
            debug!("Reconnect already scheduled");
            return;
        }
        let delay = self.config.reconnect_delay;
        // Deadline is fixed now, not when the timer task first runs
        let deadline = tokio::time::Instant::now() + delay;
        let tx = self.tx.clone();
        debug!("Reconnecting in {:?}", delay);
        self.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(SessionMessage::ReconnectDue);
        }));
    }

    fn set_state(&mut self, state: ConnectionState) -> Option<SessionEvent> {
        if self.state == state {
            return None;
        }
        debug!("Session state {} -> {}", self.state, state);
        self.state = state;
        let event = SessionEvent::StateChanged(state);
        self.publish(event.clone());
        Some(event)
    }

    fn publish(&self, event: SessionEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Session(event));
        }
    }
}

impl Drop for SessionLogClient {
    fn drop(&mut self) {
        if let Some(task) = self.connection.take() {
            task.abort();
        }
        if let Some(timer) = self.reconnect.take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for SessionLogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLogClient")
            .field("state", &self.state)
            .field("running", &self.running)
            .field("generation", &self.generation)
            .field("entries", &self.log.len())
            .field("pending_reconnect", &self.reconnect.is_some())
            .finish()
    }
}

/// Drive one connection, forwarding everything it observes.
async fn run_connection(
    connector: Arc<dyn StreamConnector>,
    generation: u64,
    tx: mpsc::UnboundedSender<SessionMessage>,
) {
    let mut stream = match connector.connect().await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx.send(SessionMessage::Closed {
                generation,
                reason: e.to_string(),
            });
            return;
        }
    };

    if tx.send(SessionMessage::Opened { generation }).is_err() {
        return;
    }

    let reason = loop {
        match stream.next_text().await {
            Some(Ok(text)) => {
                if tx.send(SessionMessage::Payload { generation, text }).is_err() {
                    return;
                }
            }
            Some(Err(e)) => break e.to_string(),
            None => break "stream ended".to_string(),
        }
    };
    let _ = tx.send(SessionMessage::Closed { generation, reason });
}
