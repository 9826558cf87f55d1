//! Candle signal CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use signal_config::load_config;
use signal_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref())
        .context("Failed to load configuration");

    // Setup logging; command-line flags win over the config file
    let mut logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    if let Some(level) = cli.log_level {
        logging.level = level.as_str().to_string();
    }
    if cli.json_logs {
        logging.format = "json".to_string();
    }
    let _guard = setup_logging(&logging);

    // Execute command
    if let Commands::ValidateConfig = cli.command {
        return cli::commands::validate::run(cli.config.as_deref(), loaded).await;
    }
    let config = loaded?;

    match cli.command {
        Commands::Exchanges => cli::commands::exchanges::run(&config).await,
        Commands::Symbols(args) => cli::commands::symbols::run(args, &config).await,
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::History(args) => cli::commands::history::run(args, &config).await,
        Commands::Stream(args) => cli::commands::stream::run(args, &config).await,
        Commands::PrintConfig => cli::commands::config::run(&config).await,
        Commands::ValidateConfig => Ok(()),
    }
}
