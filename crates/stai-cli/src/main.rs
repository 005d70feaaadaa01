//! Command-line dashboard for the StAI analytics API

mod cli;
mod commands;
mod render;

use clap::Parser;
use cli::Cli;
use stai_utils::LogFormat;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    stai_utils::init_tracing_with(Some(default_filter), LogFormat::from_env());

    info!("Starting stai {}", env!("CARGO_PKG_VERSION"));

    commands::execute(cli).await
}
