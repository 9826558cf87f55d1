//! In-memory exchange for tests and offline runs.

use async_trait::async_trait;
use signal_core::error::DataError;
use signal_core::subscription::Subscription;
use signal_core::traits::ExchangeConnector;
use signal_core::types::{Bar, Timeframe};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

type LiveScript = Vec<Result<Bar, DataError>>;

/// Connector serving canned history and scripted live bars.
///
/// A live feed delivers its script and then stays open without further bars
/// until closed, unless the script ends in an error.
pub struct MemoryConnector {
    id: String,
    history: HashMap<String, Vec<Bar>>,
    live: Mutex<HashMap<String, LiveScript>>,
    markets: Option<BTreeSet<String>>,
    streaming: bool,
    fetches: AtomicUsize,
}

impl MemoryConnector {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history: HashMap::new(),
            live: Mutex::new(HashMap::new()),
            markets: Some(BTreeSet::new()),
            streaming: true,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Serve `bars` as the history of `symbol`.
    pub fn with_history(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.markets
            .get_or_insert_with(BTreeSet::new)
            .insert(symbol.to_string());
        self.history.insert(symbol.to_string(), bars);
        self
    }

    /// Script the next live feed of `symbol`.
    pub fn with_live(self, symbol: &str, items: LiveScript) -> Self {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), items);
        self
    }

    /// Make the catalog request fail.
    pub fn with_failing_markets(mut self) -> Self {
        self.markets = None;
        self
    }

    /// Report no live feed for any timeframe.
    pub fn without_streaming(mut self) -> Self {
        self.streaming = false;
        self
    }

    /// Number of history requests served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExchangeConnector for MemoryConnector {
    fn id(&self) -> &str {
        &self.id
    }

    fn supports_timeframe(&self, _timeframe: Timeframe) -> bool {
        true
    }

    fn supports_streaming(&self, _timeframe: Timeframe) -> bool {
        self.streaming
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let bars = self
            .history
            .get(symbol)
            .ok_or_else(|| DataError::invalid_symbol(symbol, "unknown pair"))?;
        let start = bars.len().saturating_sub(limit);
        Ok(bars[start..].to_vec())
    }

    async fn watch_ohlcv(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Subscription, DataError> {
        let script = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(symbol)
            .unwrap_or_default();

        Ok(Subscription::spawn(16, move |feed, shutdown| async move {
            for item in script {
                let terminal = item.is_err();
                if feed.send(item).await.is_err() || terminal {
                    return;
                }
            }
            let _ = shutdown.await;
        }))
    }

    async fn load_markets(&self) -> Result<BTreeSet<String>, DataError> {
        self.markets
            .clone()
            .ok_or_else(|| DataError::upstream("catalog unavailable"))
    }
}
