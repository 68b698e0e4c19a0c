//! tubedigest CLI — channel transcript pipeline.
//!
//! Discovers a channel's videos, downloads their transcripts, runs them
//! through a model, and aggregates the results into one digest document.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = commands::load_cli_config(&cli)?;
    commands::init_tracing(&cli, &config)?;
    commands::run(cli, config).await
}
