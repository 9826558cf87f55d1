//! List strategies command.

use anyhow::Result;
use signal_core::types::Timeframe;
use signal_strategies::{StrategyParams, StrategyRegistry};

pub async fn run() -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ({})", info.name, info.key);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  Columns:  {}", info.columns.join(", "));
        println!("  Defaults: {}", info.default_config);
        println!();
    }

    println!("Timeframe defaults:");
    for timeframe in Timeframe::all() {
        println!("  {:>4}  {}", timeframe.to_string(), StrategyParams::default_for(*timeframe).describe());
    }
    println!();
    println!("Use --strategy <key> and --strategy-config '<json>' to select a strategy.");

    Ok(())
}
