mod auth;
mod cli;
mod config;
mod error;
mod filter;
mod metrics;
mod output;
mod providers;
mod router;
mod server;
mod status;
mod timestamp;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting gitlab-exporter");
    cli.execute().await?;

    Ok(())
}
