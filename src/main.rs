use clap::Parser;
use polarplot::cli::{run, Cli};
use polarplot::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.log_format)?;
    tracing::debug!("polarplot {} built {}", polarplot::VERSION, polarplot::BUILD_DATE);

    run(cli).await
}
