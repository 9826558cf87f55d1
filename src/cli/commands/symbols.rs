//! List symbols command.

use anyhow::{Context, Result};
use signal_config::AppConfig;
use tracing::info;

use super::repository;
use crate::cli::{OutputFormat, SymbolsArgs};

pub async fn run(args: SymbolsArgs, config: &AppConfig) -> Result<()> {
    let exchange = args
        .exchange
        .unwrap_or_else(|| config.exchanges.default_exchange.clone());
    let repo = repository(config)?;

    let symbols = repo
        .list_symbols(&exchange)
        .await
        .with_context(|| format!("Failed to list symbols on {}", exchange))?;

    let suffix = args.quote.map(|quote| format!("/{}", quote.to_uppercase()));
    let selected: Vec<&String> = symbols
        .iter()
        .filter(|symbol| suffix.as_ref().map_or(true, |s| symbol.ends_with(s.as_str())))
        .collect();
    info!("{} of {} symbols selected on {}", selected.len(), symbols.len(), exchange);

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&selected)?);
        }
        OutputFormat::Text => {
            println!("{} symbols on {}", selected.len(), exchange);
            println!("═══════════════════════════════════════════════════════════");
            for symbol in selected {
                println!("  {}", symbol);
            }
        }
    }

    Ok(())
}
