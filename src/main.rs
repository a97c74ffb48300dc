// nodedeck - dashboard client for a distributed chunked storage cluster
// Main entry point

use anyhow::Result;
use clap::Parser;

use nodedeck::cli::{handle_command, Cli};
use nodedeck::config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nodedeck=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    handle_command(&config, cli.command).await
}
