//! Validate configuration command.

use anyhow::Result;
use signal_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, loaded: Result<AppConfig>) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {:?}", path),
        None => println!("Validating built-in configuration"),
    }

    match loaded {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Default exchange: {}", config.exchanges.default_exchange);
            println!("Default market: {} {}", config.session.default_symbol, config.session.default_timeframe);
            println!("History limit: {} bars", config.session.history_limit);
            println!("Streaming window: {} bars", config.session.window);
            match &config.strategy {
                Some(strategy) => println!("Strategy: {}", strategy.describe()),
                None => println!("Strategy: timeframe default"),
            }
        }
        Err(e) => {
            println!("Configuration error: {:#}", e);
            return Err(e);
        }
    }

    Ok(())
}
