//! Streaming loop feeding snapshots to a presentation layer.

use signal_core::error::SignalResult;
use signal_core::types::AnnotatedSeries;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::session::Session;

/// Tick a streaming session `iterations` times, forwarding every snapshot.
///
/// Unchanged ticks re-send the previous snapshot. Stops early when the
/// receiver is gone. Returns the number of snapshots delivered.
pub async fn drive(
    session: &mut Session,
    iterations: usize,
    idle_timeout: Duration,
    sink: &mpsc::Sender<Arc<AnnotatedSeries>>,
) -> SignalResult<usize> {
    let mut delivered = 0;
    let mut updates = 0;

    for iteration in 0..iterations {
        let outcome = session.tick(idle_timeout).await?;
        if outcome.is_updated() {
            updates += 1;
        }

        if sink.send(outcome.into_snapshot()).await.is_err() {
            debug!("Snapshot receiver closed after {} iterations", iteration);
            break;
        }
        delivered += 1;
    }

    info!(
        "Drove {} iterations, {} with new data",
        delivered, updates
    );
    Ok(delivered)
}
