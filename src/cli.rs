use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use polarplot_communication::{DeviceApi, HttpDeviceApi};
use polarplot_settings::Config;
use tracing::debug;

use crate::console::run_console;
use crate::preview::{run_preview, PreviewArgs};
use crate::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "polarplot",
    about = "Preview G-code and drive a polargraph pen plotter",
    version
)]
pub struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the device API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Override the event stream URL
    #[arg(long, global = true)]
    pub stream_url: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a G-code file to an SVG preview.
    Preview(PreviewArgs),

    /// Interactive session console.
    Console,

    /// List serial ports known to the backend.
    Ports,

    /// Connect the backend to the plotter on a port.
    Connect {
        port: String,
    },

    /// Close the plotter connection.
    Disconnect,

    /// Print the stored session log.
    Log,

    /// Send a single command and print the result.
    Send {
        command: String,
    },

    /// Start plotting a project file.
    Run {
        project: String,
        file: String,
    },

    /// Halt motion.
    Stop,

    /// Toggle pause.
    Pause,
}

impl Cli {
    /// Configuration file merged with command line overrides
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())
            .context("loading configuration")?;
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(url) = &self.stream_url {
            config.stream.url = url.clone();
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn device_api(config: &Config) -> anyhow::Result<Arc<dyn DeviceApi>> {
    let api = HttpDeviceApi::new(&config.api.base_url, config.api.timeout())
        .context("invalid device API URL")?;
    Ok(Arc::new(api))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    debug!("Using API {} and stream {}", config.api.base_url, config.stream.url);

    let api = device_api(&config)?;
    execute(cli.command, &config, api).await
}

/// Run one subcommand against `api`
pub async fn execute(
    command: Commands,
    config: &Config,
    api: Arc<dyn DeviceApi>,
) -> anyhow::Result<()> {
    match command {
        Commands::Preview(args) => run_preview(&args, &config.preview)?,
        Commands::Console => run_console(config, api).await?,
        Commands::Ports => {
            let ports = api.list_ports().await.context("listing ports")?;
            if ports.is_empty() {
                println!("No ports found");
            }
            for port in ports {
                if port.description.is_empty() {
                    println!("{}", port.device);
                } else {
                    println!("{}\t{}", port.device, port.description);
                }
            }
        }
        Commands::Connect { port } => {
            api.connect(&port)
                .await
                .with_context(|| format!("connecting to {}", port))?;
            println!("Connected to {}", port);
        }
        Commands::Disconnect => {
            api.disconnect().await.context("disconnecting")?;
            println!("Disconnected");
        }
        Commands::Log => {
            let panel_config = crate::console::panel_config(config);
            let mut panel = polarplot_ui::ConsolePanel::new(panel_config);
            panel.replace(api.fetch_log().await.context("fetching log")?);
            for index in 0..panel.len() {
                if let Some(text) = panel.format_entry(index) {
                    println!("{}", text);
                }
            }
        }
        Commands::Send { command } => {
            let entry = api.send_command(&command).await.context("sending command")?;
            println!("{}", entry.response);
        }
        Commands::Run { project, file } => {
            api.run_file(&project, &file)
                .await
                .with_context(|| format!("starting {} from {}", file, project))?;
            println!("Plotting {}", file);
        }
        Commands::Stop => {
            api.stop().await.context("stopping")?;
            println!("Stopped");
        }
        Commands::Pause => {
            api.toggle_pause().await.context("toggling pause")?;
            println!("Pause toggled");
        }
    }
    Ok(())
}
