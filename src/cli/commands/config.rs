//! Print configuration command.

use anyhow::{Context, Result};
use signal_config::AppConfig;

pub async fn run(config: &AppConfig) -> Result<()> {
    let text = config.to_toml().context("Failed to render configuration")?;
    print!("{}", text);
    Ok(())
}
