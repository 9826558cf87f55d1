//! History command implementation.

use anyhow::{Context, Result};
use signal_config::AppConfig;
use signal_data::save_csv;
use signal_monitor::{render_summary, render_table};
use signal_session::Session;
use tracing::info;

use super::{check_symbol, repository, session_params, to_json};
use crate::cli::{HistoryArgs, OutputFormat};

pub async fn run(args: HistoryArgs, config: &AppConfig) -> Result<()> {
    let params = session_params(config, &args.market)?;
    let repo = repository(config)?;
    info!(
        "Loading {} {} from {} with {}",
        params.symbol,
        params.timeframe,
        params.exchange,
        params.effective_strategy().describe()
    );

    check_symbol(&repo, &params).await;
    let mut session = Session::new(params);
    let annotated = session
        .load(&repo)
        .await
        .context("Failed to load history")?;

    match args.output {
        OutputFormat::Json => {
            println!("{}", to_json(&annotated)?);
        }
        OutputFormat::Text => {
            println!("{}", render_summary(&annotated));
            println!();
            print!("{}", render_table(&annotated, args.rows));
        }
    }

    if let Some(path) = &args.save {
        save_csv(&annotated, path).context("Failed to save CSV")?;
        info!("Series saved to {:?}", path);
    }

    Ok(())
}
