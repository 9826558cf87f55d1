//! WebSocket kline feeds.
//!
//! Every connector describes its live feed as a [`KlineStream`]: where to
//! connect, what to send on subscribe, keep-alive and unsubscribe, and how to
//! turn a text frame into bars. The socket itself is owned by the background
//! task behind the returned [`Subscription`].

use futures::{SinkExt, StreamExt};
use signal_core::error::DataError;
use signal_core::subscription::{BarFeed, ShutdownSignal, Subscription};
use signal_core::types::Bar;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a single text frame carried.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    /// Kline updates, oldest first.
    Bars(Vec<Bar>),
    /// The exchange refused the subscription.
    Rejected(String),
    /// Acknowledgements, heartbeats and other control traffic.
    Ignored,
}

pub(crate) type FrameParser = fn(&str) -> Result<Frame, DataError>;

/// Application-level keep-alive message.
#[derive(Debug, Clone)]
pub(crate) struct Heartbeat {
    pub every: Duration,
    pub message: String,
}

/// Description of one exchange kline feed.
pub(crate) struct KlineStream {
    pub url: String,
    /// Unified symbol, used in error reports.
    pub symbol: String,
    pub subscribe: Option<String>,
    pub unsubscribe: Option<String>,
    pub heartbeat: Option<Heartbeat>,
    pub parse: FrameParser,
}

impl KlineStream {
    /// Connect, subscribe and hand the socket to a background task.
    pub async fn open(self, buffer: usize) -> Result<Subscription, DataError> {
        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(DataError::upstream)?;

        if let Some(subscribe) = &self.subscribe {
            ws.send(Message::Text(subscribe.clone()))
                .await
                .map_err(DataError::upstream)?;
        }

        info!("Live feed opened for {} at {}", self.symbol, self.url);
        Ok(Subscription::spawn(buffer, move |feed, shutdown| {
            self.pump(ws, feed, shutdown)
        }))
    }

    async fn pump(self, ws: WsStream, feed: BarFeed, mut shutdown: ShutdownSignal) {
        let (mut write, mut read) = ws.split();
        let mut heartbeat = self.heartbeat.as_ref().map(|h| {
            let mut interval = tokio::time::interval_at(Instant::now() + h.every, h.every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        let failure = 'feed: loop {
            tokio::select! {
                _ = &mut shutdown => break 'feed None,
                _ = next_tick(&mut heartbeat) => {
                    if let Some(h) = &self.heartbeat {
                        if let Err(e) = write.send(Message::Text(h.message.clone())).await {
                            break 'feed Some(DataError::upstream(e));
                        }
                    }
                }
                message = read.next() => match message {
                    Some(Ok(Message::Text(text))) => match (self.parse)(&text) {
                        Ok(Frame::Bars(bars)) => {
                            for bar in bars {
                                if feed.send(Ok(bar)).await.is_err() {
                                    break 'feed None;
                                }
                            }
                        }
                        Ok(Frame::Rejected(reason)) => {
                            break 'feed Some(DataError::invalid_symbol(&self.symbol, reason));
                        }
                        Ok(Frame::Ignored) => {}
                        Err(e) => break 'feed Some(e),
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = write.send(Message::Pong(payload)).await {
                            break 'feed Some(DataError::upstream(e));
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break 'feed Some(DataError::StreamClosed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break 'feed Some(DataError::upstream(e)),
                },
            }
        };

        if let Some(err) = failure {
            warn!("Live feed for {} ended: {}", self.symbol, err);
            let _ = feed.send(Err(err)).await;
        }

        if let Some(unsubscribe) = &self.unsubscribe {
            let _ = write.send(Message::Text(unsubscribe.clone())).await;
        }
        let _ = write.send(Message::Close(None)).await;
        debug!("Live feed released for {}", self.symbol);
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
