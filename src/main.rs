use anyhow::Result;
use chem_research_assistant::{cli, workflow::launch};
use clap::Parser;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let config = args.into_config()?;

    let max_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    launch(&config, args.command).await
}
