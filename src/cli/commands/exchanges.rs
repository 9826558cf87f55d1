//! List exchanges command.

use anyhow::Result;
use signal_config::AppConfig;
use signal_core::types::Timeframe;

use super::repository;

pub async fn run(config: &AppConfig) -> Result<()> {
    let repo = repository(config)?;

    println!("Supported Exchanges");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for id in repo.exchanges() {
        let marker = if id == config.exchanges.default_exchange {
            " (default)"
        } else {
            ""
        };
        let streams = Timeframe::all()
            .iter()
            .filter(|tf| repo.supports_streaming(&id, **tf).unwrap_or(false))
            .map(|tf| tf.to_string())
            .collect::<Vec<_>>();

        println!("  {}{}", id, marker);
        println!("  ───────────────────────────────────────────────────────");
        if streams.is_empty() {
            println!("  Live bars: not supported");
        } else {
            println!("  Live bars: {}", streams.join(", "));
        }
        println!();
    }

    println!("Use --exchange <id> to select an exchange.");

    Ok(())
}
