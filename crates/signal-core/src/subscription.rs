//! Live bar subscription handle.
//!
//! A subscription is a bounded channel fed by a background task that owns
//! the exchange connection. The consumer pulls bars with [`Subscription::next`]
//! and must release the connection with [`Subscription::close`]; dropping the
//! handle also signals the task to shut down, but without waiting for it.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::DataError;
use crate::types::Bar;

/// Sending half handed to the background task.
pub type BarFeed = mpsc::Sender<Result<Bar, DataError>>;

/// Signal the background task receives when the consumer goes away.
pub type ShutdownSignal = oneshot::Receiver<()>;

/// How long `close` waits for the task before aborting it.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Handle to an unbounded, non-restartable sequence of live bars.
pub struct Subscription {
    rx: mpsc::Receiver<Result<Bar, DataError>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawn `worker` on the runtime and return the consuming handle.
    ///
    /// The worker pushes bars (or a terminal error) into the feed and must
    /// return once the shutdown signal resolves, whether it was sent
    /// explicitly or its sender was dropped.
    pub fn spawn<F, Fut>(buffer: usize, worker: F) -> Self
    where
        F: FnOnce(BarFeed, ShutdownSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(worker(tx, shutdown_rx));

        Self {
            rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Wrap a plain receiver with no background task behind it.
    pub fn from_receiver(rx: mpsc::Receiver<Result<Bar, DataError>>) -> Self {
        Self {
            rx,
            shutdown: None,
            task: None,
        }
    }

    /// Wait for the next bar.
    ///
    /// Cancel-safe: dropping the future loses no bar. Once the feed is gone
    /// this returns `DataError::StreamClosed`.
    pub async fn next(&mut self) -> Result<Bar, DataError> {
        match self.rx.recv().await {
            Some(item) => item,
            None => Err(DataError::StreamClosed),
        }
    }

    /// Stop the feed and wait for the background task to release its connection.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.rx.close();

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(CLOSE_GRACE, &mut task).await {
                Ok(Ok(())) => debug!("Subscription task finished"),
                Ok(Err(e)) => warn!("Subscription task failed: {}", e),
                Err(_) => {
                    warn!("Subscription task did not stop in time, aborting");
                    task.abort();
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn bar(ts: i64) -> Bar {
        Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0)
    }

    fn ticking_worker(
        released: Arc<AtomicBool>,
    ) -> impl FnOnce(BarFeed, ShutdownSignal) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>>
    {
        move |feed, mut shutdown| {
            Box::pin(async move {
                let mut ts = 0;
                loop {
                    tokio::select! {
                        _ = &mut shutdown => break,
                        sent = feed.send(Ok(bar(ts))) => {
                            if sent.is_err() {
                                break;
                            }
                            ts += 60_000;
                        }
                    }
                }
                released.store(true, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn test_next_yields_bars_in_order() {
        let released = Arc::new(AtomicBool::new(false));
        let mut sub = Subscription::spawn(4, ticking_worker(released.clone()));

        assert_eq!(sub.next().await.unwrap().timestamp, 0);
        assert_eq!(sub.next().await.unwrap().timestamp, 60_000);

        sub.close().await;
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_drop_signals_shutdown() {
        let released = Arc::new(AtomicBool::new(false));
        let sub = Subscription::spawn(1, ticking_worker(released.clone()));
        drop(sub);

        for _ in 0..50 {
            if released.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_exhausted_feed_reports_stream_closed() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(Ok(bar(0))).await.unwrap();
        drop(tx);

        let mut sub = Subscription::from_receiver(rx);
        assert!(sub.next().await.is_ok());
        assert!(matches!(sub.next().await, Err(DataError::StreamClosed)));
    }

    #[tokio::test]
    async fn test_errors_are_propagated() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(Err(DataError::upstream("connection reset")))
            .await
            .unwrap();

        let mut sub = Subscription::from_receiver(rx);
        assert!(matches!(sub.next().await, Err(DataError::Upstream(_))));
    }
}
