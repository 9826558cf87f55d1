//! Series repository: the single entry point for market data.

use signal_core::error::DataError;
use signal_core::subscription::Subscription;
use signal_core::traits::ExchangeConnector;
use signal_core::types::{BarSeries, Timeframe};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::SymbolCache;
use crate::registry::{ConnectorSettings, ExchangeRegistry};

/// Fetches history, opens live feeds and lists symbols by exchange id.
#[derive(Debug, Clone)]
pub struct SeriesRepository {
    registry: ExchangeRegistry,
    symbols: SymbolCache,
}

impl SeriesRepository {
    pub fn new(registry: ExchangeRegistry) -> Self {
        Self {
            registry,
            symbols: SymbolCache::new(),
        }
    }

    /// Repository over every built-in exchange.
    pub fn with_defaults(settings: ConnectorSettings) -> Result<Self, DataError> {
        Ok(Self::new(ExchangeRegistry::with_defaults(settings)?))
    }

    /// Sorted ids of the supported exchanges.
    pub fn exchanges(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// Connector for an exchange id.
    pub fn connector(&self, exchange: &str) -> Result<Arc<dyn ExchangeConnector>, DataError> {
        self.registry.get(exchange)
    }

    /// Whether the exchange has a live feed for the timeframe.
    pub fn supports_streaming(&self, exchange: &str, timeframe: Timeframe) -> Result<bool, DataError> {
        Ok(self.registry.get(exchange)?.supports_streaming(timeframe))
    }

    /// Fetch up to `limit` of the most recent bars.
    ///
    /// The result is sorted ascending without duplicate timestamps. Exchange
    /// and limit are validated before any network activity.
    pub async fn fetch_history(
        &self,
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<BarSeries, DataError> {
        let connector = self.registry.get(exchange)?;
        if limit == 0 {
            return Err(DataError::InvalidLimit(limit));
        }
        if !connector.supports_timeframe(timeframe) {
            return Err(DataError::invalid_symbol(
                symbol,
                format!("{} has no {} candles", exchange, timeframe),
            ));
        }

        let bars = connector.fetch_ohlcv(symbol, timeframe, limit).await?;
        let inconsistent = bars.iter().filter(|b| !b.is_consistent()).count();
        if inconsistent > 0 {
            warn!("{} returned {} inconsistent bars for {}", exchange, inconsistent, symbol);
        }

        let mut series = BarSeries::from_bars(symbol, timeframe, bars);
        series.keep_last(limit);

        info!(
            "Fetched {} {} bars for {} from {}",
            series.len(),
            timeframe,
            symbol,
            exchange
        );
        Ok(series)
    }

    /// Open a live bar feed.
    ///
    /// The pair is probed with a one-bar history request first, so an invalid
    /// symbol fails here exactly as it does in [`fetch_history`](Self::fetch_history).
    pub async fn subscribe(
        &self,
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Subscription, DataError> {
        let connector = self.registry.get(exchange)?;
        if !connector.supports_streaming(timeframe) {
            return Err(DataError::invalid_symbol(
                symbol,
                format!("{} has no live {} feed", exchange, timeframe),
            ));
        }

        self.fetch_history(exchange, symbol, timeframe, 1).await?;
        let subscription = connector.watch_ohlcv(symbol, timeframe).await?;

        info!("Subscribed to {} {} on {}", symbol, timeframe, exchange);
        Ok(subscription)
    }

    /// Load the tradable symbol catalog.
    ///
    /// `Ok` with an empty set means the exchange lists no symbols; a failed
    /// request is an error.
    pub async fn list_symbols(&self, exchange: &str) -> Result<BTreeSet<String>, DataError> {
        let connector = self.registry.get(exchange)?;
        let symbols = connector.load_markets().await?;
        debug!("{} lists {} symbols", exchange, symbols.len());
        Ok(symbols)
    }

    /// Like [`list_symbols`](Self::list_symbols), but logs failures and returns an empty set.
    pub async fn list_symbols_or_empty(&self, exchange: &str) -> BTreeSet<String> {
        match self.list_symbols(exchange).await {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!("Could not load symbols for {}: {}", exchange, e);
                BTreeSet::new()
            }
        }
    }

    /// Symbol catalog, loaded on first request and cached per exchange.
    ///
    /// Meant for long-lived front ends that reload the catalog only when the
    /// selected exchange changes.
    pub async fn cached_symbols(&self, exchange: &str) -> Result<Arc<BTreeSet<String>>, DataError> {
        if let Some(symbols) = self.symbols.get(exchange) {
            return Ok(symbols);
        }
        let symbols = self.list_symbols(exchange).await?;
        Ok(self.symbols.put(exchange, symbols))
    }

    /// Drop a cached catalog, or all of them.
    pub fn clear_symbol_cache(&self, exchange: Option<&str>) {
        match exchange {
            Some(exchange) => self.symbols.clear(exchange),
            None => self.symbols.clear_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryConnector;
    use signal_core::types::Bar;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close + 1.0, close - 1.0, close, 10.0)
    }

    fn repository(connector: MemoryConnector) -> SeriesRepository {
        let mut registry = ExchangeRegistry::new();
        registry.register(Arc::new(connector));
        SeriesRepository::new(registry)
    }

    fn shuffled_history() -> Vec<Bar> {
        vec![
            bar(120_000, 3.0),
            bar(0, 1.0),
            bar(60_000, 2.0),
            bar(60_000, 2.5),
            bar(180_000, 4.0),
        ]
    }

    #[tokio::test]
    async fn test_fetch_history_normalizes() {
        let repo = repository(MemoryConnector::new("mem").with_history("BTC/USDT", shuffled_history()));

        let series = repo
            .fetch_history("mem", "BTC/USDT", Timeframe::Minute1, 500)
            .await
            .unwrap();

        assert_eq!(series.timestamps(), vec![0, 60_000, 120_000, 180_000]);
        assert!((series.get(1).unwrap().close - 2.5).abs() < 1e-10);
        assert!(series.timestamps().windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_fetch_history_respects_limit() {
        let bars: Vec<Bar> = (0..50).map(|i| bar(i * 60_000, i as f64)).collect();
        let repo = repository(MemoryConnector::new("mem").with_history("BTC/USDT", bars));

        let series = repo
            .fetch_history("mem", "BTC/USDT", Timeframe::Minute1, 10)
            .await
            .unwrap();
        assert_eq!(series.len(), 10);
        assert_eq!(series.last().unwrap().timestamp, 49 * 60_000);
    }

    #[tokio::test]
    async fn test_unknown_exchange_before_network() {
        let repo = repository(MemoryConnector::new("mem"));

        let result = repo
            .fetch_history("not_a_real_exchange", "BTC/USDT", Timeframe::Minute1, 500)
            .await;
        assert!(matches!(result, Err(DataError::UnknownExchange(_))));
        assert!(matches!(
            repo.subscribe("not_a_real_exchange", "BTC/USDT", Timeframe::Minute1).await,
            Err(DataError::UnknownExchange(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected() {
        let repo = repository(MemoryConnector::new("mem").with_history("BTC/USDT", shuffled_history()));

        let result = repo
            .fetch_history("mem", "BTC/USDT", Timeframe::Minute1, 0)
            .await;
        assert!(matches!(result, Err(DataError::InvalidLimit(0))));
    }

    #[tokio::test]
    async fn test_subscribe_probes_symbol() {
        let repo = repository(MemoryConnector::new("mem"));

        let result = repo.subscribe("mem", "FOO/BAR", Timeframe::Minute1).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol { .. })));
    }

    #[tokio::test]
    async fn test_subscribe_delivers_live_bars() {
        let repo = repository(
            MemoryConnector::new("mem")
                .with_history("BTC/USDT", shuffled_history())
                .with_live("BTC/USDT", vec![Ok(bar(240_000, 5.0))]),
        );

        let mut sub = repo
            .subscribe("mem", "BTC/USDT", Timeframe::Minute1)
            .await
            .unwrap();
        assert_eq!(sub.next().await.unwrap().timestamp, 240_000);
        sub.close().await;
    }

    #[tokio::test]
    async fn test_subscribe_without_live_feed() {
        let repo = repository(
            MemoryConnector::new("mem")
                .with_history("BTC/USDT", shuffled_history())
                .without_streaming(),
        );

        assert!(!repo.supports_streaming("mem", Timeframe::Minute1).unwrap());
        assert!(repo
            .subscribe("mem", "BTC/USDT", Timeframe::Minute1)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_list_symbols_distinguishes_empty_from_failure() {
        let repo = repository(MemoryConnector::new("mem"));
        assert!(repo.list_symbols("mem").await.unwrap().is_empty());

        let repo = repository(MemoryConnector::new("mem").with_failing_markets());
        assert!(matches!(
            repo.list_symbols("mem").await,
            Err(DataError::Upstream(_))
        ));
        assert!(repo.list_symbols_or_empty("mem").await.is_empty());
    }

    #[tokio::test]
    async fn test_cached_symbols() {
        let repo = repository(MemoryConnector::new("mem").with_history("ETH/USDT", Vec::new()));

        let first = repo.cached_symbols("mem").await.unwrap();
        let second = repo.cached_symbols("mem").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.contains("ETH/USDT"));

        repo.clear_symbol_cache(Some("mem"));
        let third = repo.cached_symbols("mem").await.unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_exchanges_sorted() {
        let mut registry = ExchangeRegistry::new();
        registry.register(Arc::new(MemoryConnector::new("zeta")));
        registry.register(Arc::new(MemoryConnector::new("alpha")));
        let repo = SeriesRepository::new(registry);

        assert_eq!(repo.exchanges(), vec!["alpha", "zeta"]);
    }
}
