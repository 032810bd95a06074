//! Interactive session console.
//!
//! Commands typed on stdin are dispatched to the device; the session log
//! (stream entries plus local echoes) is printed as it grows.

use std::sync::Arc;

use anyhow::Context;
use polarplot_communication::{
    CommandDispatcher, DeviceApi, SessionConfig, SessionLogClient, WebSocketConnector,
};
use polarplot_core::{
    AppEvent, EventBus, EventCategory, EventFilter, LogEntry, SessionEvent, SubscriptionId,
};
use polarplot_settings::Config;
use polarplot_ui::{ConsolePanel, ConsolePanelConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Empty,
    Command(String),
    Stop,
    Pause,
    Clear,
    Reload,
    Help,
    Quit,
    Unknown(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ConsoleInput::Empty;
        }
        let Some(directive) = line.strip_prefix('/') else {
            return ConsoleInput::Command(line.to_string());
        };
        match directive.to_ascii_lowercase().as_str() {
            "stop" => ConsoleInput::Stop,
            "pause" => ConsoleInput::Pause,
            "clear" => ConsoleInput::Clear,
            "reload" => ConsoleInput::Reload,
            "help" | "?" => ConsoleInput::Help,
            "quit" | "exit" | "q" => ConsoleInput::Quit,
            _ => ConsoleInput::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "\
Type a G-code or device command to send it.
  /stop    halt motion
  /pause   toggle pause
  /clear   clear the stored log
  /reload  fetch the full log again
  /quit    leave the console";

pub fn session_config(config: &Config) -> SessionConfig {
    SessionConfig {
        reconnect_delay: config.stream.reconnect_delay(),
        seen_key_capacity: config.stream.seen_key_capacity,
    }
}

pub fn panel_config(config: &Config) -> ConsolePanelConfig {
    ConsolePanelConfig {
        page_size: config.console.page_size,
        response_preview_chars: config.console.response_preview_chars,
        follow_threshold_px: config.console.follow_threshold_px,
    }
}

/// Lines to print for a session change
pub fn render_event(
    panel: &mut ConsolePanel,
    event: &SessionEvent,
    entries: &[LogEntry],
) -> Vec<String> {
    let before = panel.len();
    panel.apply(event, entries);

    match event {
        SessionEvent::StateChanged(state) => vec![format!("[stream] {}", state)],
        SessionEvent::EntryAppended { .. } => (before..panel.len())
            .filter_map(|index| panel.format_entry(index))
            .collect(),
        SessionEvent::LogReloaded { count } => {
            let mut lines = vec![format!("[log] {} entries", count)];
            let page: Vec<usize> = panel.page_entries().map(|(index, _)| index).collect();
            lines.extend(page.into_iter().filter_map(|index| panel.format_entry(index)));
            lines
        }
        SessionEvent::LogCleared => vec!["[log] cleared".to_string()],
        SessionEvent::CommandFailed { command, message } => {
            vec![format!("[error] {}: {}", command, message)]
        }
    }
}

/// Hand a line to `sink` for every failed command published on `bus`
pub fn watch_failures<F>(bus: &EventBus, sink: F) -> SubscriptionId
where
    F: Fn(String) + Send + Sync + 'static,
{
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Session]),
        move |event| {
            if let AppEvent::Session(SessionEvent::CommandFailed { command, message }) = event {
                sink(format!("[error] {}: {}", command, message));
            }
        },
    )
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

async fn reload(
    api: &Arc<dyn DeviceApi>,
    client: &mut SessionLogClient,
    panel: &mut ConsolePanel,
) {
    match api.fetch_log().await {
        Ok(entries) => {
            let event = client.reload(entries);
            print_lines(&render_event(panel, &event, client.entries()));
        }
        Err(e) => {
            warn!("Could not fetch the session log: {}", e);
            println!("[error] could not fetch log: {}", e);
        }
    }
}

pub async fn run_console(config: &Config, api: Arc<dyn DeviceApi>) -> anyhow::Result<()> {
    let connector = Arc::new(
        WebSocketConnector::new(&config.stream.url).context("invalid event stream URL")?,
    );
    let bus = Arc::new(EventBus::new());
    watch_failures(&bus, |line| println!("{}", line));

    let mut client = SessionLogClient::new(connector, session_config(config));
    let dispatcher =
        CommandDispatcher::new(Arc::clone(&api), client.echo_sender()).with_event_bus(bus);
    let mut panel = ConsolePanel::new(panel_config(config));

    reload(&api, &mut client, &mut panel).await;
    client.start();
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = client.pump() => {
                let Some(event) = event else { break };
                print_lines(&render_event(&mut panel, &event, client.entries()));
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    debug!("stdin closed");
                    break;
                };
                match ConsoleInput::parse(&line) {
                    ConsoleInput::Empty => {}
                    ConsoleInput::Command(command) => {
                        let dispatcher = dispatcher.clone();
                        // Failures are printed by the bus subscription
                        tokio::spawn(async move {
                            let _ = dispatcher.send(&command).await;
                        });
                    }
                    ConsoleInput::Stop => {
                        if let Err(e) = api.stop().await {
                            println!("[error] stop: {}", e);
                        }
                    }
                    ConsoleInput::Pause => {
                        if let Err(e) = api.toggle_pause().await {
                            println!("[error] pause: {}", e);
                        }
                    }
                    ConsoleInput::Clear => match api.clear_log().await {
                        Ok(()) => {
                            let event = client.clear();
                            print_lines(&render_event(&mut panel, &event, client.entries()));
                        }
                        Err(e) => println!("[error] clear: {}", e),
                    },
                    ConsoleInput::Reload => reload(&api, &mut client, &mut panel).await,
                    ConsoleInput::Help => println!("{}", HELP),
                    ConsoleInput::Quit => break,
                    ConsoleInput::Unknown(text) => println!("unknown directive {}, try /help", text),
                }
            }
        }
    }

    client.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polarplot_core::{ConnectionState, EntryOrigin};
    use std::sync::Mutex;

    #[test]
    fn test_parse_input() {
        assert_eq!(ConsoleInput::parse("   "), ConsoleInput::Empty);
        assert_eq!(
            ConsoleInput::parse(" G1 X10 Y10 "),
            ConsoleInput::Command("G1 X10 Y10".to_string())
        );
        assert_eq!(ConsoleInput::parse("/STOP"), ConsoleInput::Stop);
        assert_eq!(ConsoleInput::parse("/q"), ConsoleInput::Quit);
        assert_eq!(
            ConsoleInput::parse("/home"),
            ConsoleInput::Unknown("/home".to_string())
        );
    }

    #[test]
    fn test_config_mapping() {
        let mut config = Config::default();
        config.stream.reconnect_delay_ms = 750;
        config.console.page_size = 10;

        assert_eq!(
            session_config(&config).reconnect_delay,
            std::time::Duration::from_millis(750)
        );
        assert_eq!(panel_config(&config).page_size, 10);
    }

    #[test]
    fn test_render_appended_entry() {
        let mut panel = ConsolePanel::new(ConsolePanelConfig::default());
        let entry = LogEntry::new("2024-05-01T10:11:12Z", "M114", "X:0 Y:0\nok");
        let event = SessionEvent::EntryAppended {
            entry: entry.clone(),
            origin: EntryOrigin::LocalEcho,
        };

        let lines = render_event(&mut panel, &event, &[]);
        assert_eq!(lines, vec!["[10:11:12] > M114\n  X:0 Y:0\n  ok".to_string()]);
        assert_eq!(panel.len(), 1);
    }

    #[test]
    fn test_render_reload_and_state() {
        let mut panel = ConsolePanel::new(ConsolePanelConfig::default());
        let entries = vec![
            LogEntry::new("2024-05-01T10:00:00Z", "G28", "ok"),
            LogEntry::new("2024-05-01T10:00:01Z", "G1 X5", "ok"),
        ];
        let lines = render_event(&mut panel, &SessionEvent::LogReloaded { count: 2 }, &entries);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[log] 2 entries");

        let lines = render_event(
            &mut panel,
            &SessionEvent::StateChanged(ConnectionState::Connected),
            &[],
        );
        assert_eq!(lines, vec!["[stream] Connected".to_string()]);
        assert_eq!(panel.len(), 2);
    }

    #[test]
    fn test_failed_commands_reach_the_watcher() {
        let bus = EventBus::new();
        let printed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&printed);
        watch_failures(&bus, move |line| sink.lock().unwrap().push(line));

        bus.publish(AppEvent::Session(SessionEvent::LogCleared));
        bus.publish(AppEvent::Session(SessionEvent::CommandFailed {
            command: "G28".to_string(),
            message: "HTTP 409 from /plotter/command: Not connected".to_string(),
        }));

        assert_eq!(
            *printed.lock().unwrap(),
            vec!["[error] G28: HTTP 409 from /plotter/command: Not connected".to_string()]
        );
    }
}
