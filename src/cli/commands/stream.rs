//! Stream command implementation.

use anyhow::{Context, Result};
use signal_config::AppConfig;
use signal_core::types::AnnotatedSeries;
use signal_data::save_csv;
use signal_monitor::render_summary;
use signal_session::{drive, Session, SessionState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{check_symbol, repository, session_params, to_json};
use crate::cli::{OutputFormat, StreamArgs};

pub async fn run(args: StreamArgs, config: &AppConfig) -> Result<()> {
    let mut params = session_params(config, &args.market)?;
    if let Some(window) = args.window {
        params = params.with_window(window);
    }
    let iterations = args.iterations.unwrap_or(config.session.stream_iterations);
    let idle_timeout = args
        .idle_timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.session.idle_timeout());

    let repo = repository(config)?;
    check_symbol(&repo, &params).await;
    let mut session = Session::new(params);
    let loaded = session
        .load(&repo)
        .await
        .context("Failed to load history")?;
    info!("Loaded: {}", render_summary(&loaded));

    session
        .start_streaming(&repo)
        .await
        .context("Failed to start streaming")?;

    let (tx, rx) = mpsc::channel(config.exchanges.channel_buffer);
    let printer = tokio::spawn(print_snapshots(rx, args.output));

    let driven = tokio::select! {
        result = drive(&mut session, iterations, idle_timeout, &tx) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping stream");
            Ok(0)
        }
    };
    drop(tx);
    let last = printer.await.context("Snapshot printer failed")?;

    if session.state() == SessionState::Streaming {
        session.stop_streaming().await?;
    }
    let delivered = driven.context("Streaming failed")?;
    info!("Delivered {} snapshots", delivered);

    if let Some(path) = &args.save {
        match last.or_else(|| session.snapshot()) {
            Some(annotated) => {
                save_csv(&annotated, path).context("Failed to save CSV")?;
                info!("Window saved to {:?}", path);
            }
            None => warn!("No data to save"),
        }
    }

    Ok(())
}

/// Print every snapshot as it arrives; returns the last one.
async fn print_snapshots(
    mut rx: mpsc::Receiver<Arc<AnnotatedSeries>>,
    output: OutputFormat,
) -> Option<Arc<AnnotatedSeries>> {
    let mut last = None;
    while let Some(snapshot) = rx.recv().await {
        match output {
            OutputFormat::Json => match to_json(&snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Skipping snapshot: {:#}", e),
            },
            OutputFormat::Text => println!("{}", render_summary(&snapshot)),
        }
        last = Some(snapshot);
    }
    last
}
