//! Session orchestrator.

use signal_core::error::{IndicatorError, SessionError, SignalResult};
use signal_core::subscription::Subscription;
use signal_core::traits::Strategy;
use signal_core::types::{AnnotatedSeries, BarSeries, PushOutcome, Timeframe};
use signal_data::SeriesRepository;
use signal_strategies::StrategyParams;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::state::{SessionParams, SessionState, TickOutcome};

/// One interactive session: a series, its annotation and an optional live feed.
///
/// Driven through `&mut self` by a single task; the repository is passed in
/// for the calls that need the network.
#[derive(Debug)]
pub struct Session {
    params: SessionParams,
    state: SessionState,
    series: Option<BarSeries>,
    snapshot: Option<Arc<AnnotatedSeries>>,
    subscription: Option<Subscription>,
}

impl Session {
    pub fn new(params: SessionParams) -> Self {
        Self {
            params,
            state: SessionState::Idle,
            series: None,
            snapshot: None,
            subscription: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// Latest annotation, if anything has been loaded.
    pub fn snapshot(&self) -> Option<Arc<AnnotatedSeries>> {
        self.snapshot.clone()
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        invalid(action, self.state)
    }

    fn annotate(&self, series: &BarSeries) -> Result<Arc<AnnotatedSeries>, IndicatorError> {
        Ok(Arc::new(self.params.effective_strategy().apply(series)?))
    }

    /// Fetch `history_limit` bars and annotate them.
    ///
    /// Allowed while idle or loaded. On failure nothing changes.
    pub async fn load(&mut self, repo: &SeriesRepository) -> SignalResult<Arc<AnnotatedSeries>> {
        if self.state == SessionState::Streaming {
            return Err(self.invalid("load").into());
        }

        let series = repo
            .fetch_history(
                &self.params.exchange,
                &self.params.symbol,
                self.params.timeframe,
                self.params.history_limit,
            )
            .await?;
        let snapshot = self.annotate(&series)?;

        info!(
            "Session loaded {} bars of {} {} on {}",
            series.len(),
            self.params.symbol,
            self.params.timeframe,
            self.params.exchange
        );
        self.series = Some(series);
        self.snapshot = Some(snapshot.clone());
        self.state = SessionState::Loaded;
        Ok(snapshot)
    }

    /// Open the live feed and switch to the rolling window.
    ///
    /// The retained series is cut to `window` bars and re-annotated.
    pub async fn start_streaming(
        &mut self,
        repo: &SeriesRepository,
    ) -> SignalResult<Arc<AnnotatedSeries>> {
        if self.state != SessionState::Loaded {
            return Err(self.invalid("start streaming").into());
        }
        if self.params.window == 0 {
            return Err(IndicatorError::InvalidParameter(
                "Streaming window must be at least 1 bar".to_string(),
            )
            .into());
        }
        if !repo.supports_streaming(&self.params.exchange, self.params.timeframe)? {
            return Err(SessionError::StreamingUnsupported {
                exchange: self.params.exchange.clone(),
                timeframe: self.params.timeframe.to_string(),
            }
            .into());
        }

        let subscription = repo
            .subscribe(
                &self.params.exchange,
                &self.params.symbol,
                self.params.timeframe,
            )
            .await?;

        let mut series = self.series.take().unwrap_or_else(|| {
            BarSeries::new(self.params.symbol.clone(), self.params.timeframe)
        });
        series.set_capacity(self.params.window);

        let snapshot = match self.annotate(&series) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.series = Some(series);
                subscription.close().await;
                return Err(e.into());
            }
        };

        info!(
            "Session streaming {} {} with a {}-bar window",
            self.params.symbol, self.params.timeframe, self.params.window
        );
        self.series = Some(series);
        self.snapshot = Some(snapshot.clone());
        self.subscription = Some(subscription);
        self.state = SessionState::Streaming;
        Ok(snapshot)
    }

    /// Wait up to `idle_timeout` for the next live bar.
    ///
    /// A feed error closes the subscription and returns the session to
    /// `Loaded` before the error is returned.
    pub async fn tick(&mut self, idle_timeout: Duration) -> SignalResult<TickOutcome> {
        let state = self.state;
        let (Some(subscription), Some(snapshot)) = (self.subscription.as_mut(), self.snapshot.clone())
        else {
            return Err(invalid("tick", state).into());
        };

        let bar = match tokio::time::timeout(idle_timeout, subscription.next()).await {
            Err(_) => {
                debug!("No bar within {:?}", idle_timeout);
                return Ok(TickOutcome::Unchanged(snapshot));
            }
            Ok(Err(e)) => {
                warn!("Live feed failed, falling back to loaded state: {}", e);
                self.close_subscription().await;
                self.state = SessionState::Loaded;
                return Err(e.into());
            }
            Ok(Ok(bar)) => bar,
        };

        let Some(series) = self.series.as_mut() else {
            return Err(invalid("tick", state).into());
        };
        match series.push(bar) {
            PushOutcome::Stale => {
                debug!("Ignoring stale bar at {}", bar.timestamp);
                return Ok(TickOutcome::Unchanged(snapshot));
            }
            outcome => debug!("{:?} bar at {}, {} retained", outcome, bar.timestamp, series.len()),
        }

        let snapshot = match self.series.as_ref() {
            Some(series) => self.annotate(series)?,
            None => return Err(self.invalid("tick").into()),
        };
        self.snapshot = Some(snapshot.clone());
        Ok(TickOutcome::Updated(snapshot))
    }

    /// Close the live feed and return to `Loaded`.
    pub async fn stop_streaming(&mut self) -> SignalResult<()> {
        if self.state != SessionState::Streaming {
            return Err(self.invalid("stop streaming").into());
        }
        self.close_subscription().await;
        self.state = SessionState::Loaded;
        info!("Session stopped streaming {}", self.params.symbol);
        Ok(())
    }

    /// Switch market, dropping all data and any live feed.
    pub async fn reset(
        &mut self,
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        timeframe: Timeframe,
    ) {
        self.close_subscription().await;
        self.params.exchange = exchange.into();
        self.params.symbol = symbol.into();
        self.params.timeframe = timeframe;
        self.series = None;
        self.snapshot = None;
        self.state = SessionState::Idle;
        info!(
            "Session reset to {} {} on {}",
            self.params.symbol, self.params.timeframe, self.params.exchange
        );
    }

    /// Replace the strategy and re-annotate the current series without refetching.
    ///
    /// Returns the new snapshot when there is data to annotate.
    pub fn set_strategy(
        &mut self,
        strategy: StrategyParams,
    ) -> SignalResult<Option<Arc<AnnotatedSeries>>> {
        strategy.validate()?;
        self.params.strategy = Some(strategy);

        let Some(series) = self.series.as_ref() else {
            return Ok(None);
        };
        let snapshot = self.annotate(series)?;
        self.snapshot = Some(snapshot.clone());
        info!("Session strategy set to {}", strategy.describe());
        Ok(Some(snapshot))
    }

    async fn close_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close().await;
        }
    }
}

fn invalid(action: &'static str, state: SessionState) -> SessionError {
    SessionError::InvalidState {
        action,
        state: state.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::error::{DataError, ErrorKind};
    use signal_core::types::Bar;
    use signal_data::{ExchangeRegistry, MemoryConnector};
    use signal_strategies::{EmaCrossoverConfig, RsiConfig};

    const TICK: Duration = Duration::from_millis(50);

    fn bar(minute: i64, close: f64) -> Bar {
        Bar::new(minute * 60_000, close, close + 0.5, close - 0.5, close, 1.0)
    }

    fn rising(count: i64) -> Vec<Bar> {
        (0..count).map(|i| bar(i, 100.0 + i as f64)).collect()
    }

    fn repository(connector: MemoryConnector) -> (SeriesRepository, Arc<MemoryConnector>) {
        let connector = Arc::new(connector);
        let mut registry = ExchangeRegistry::new();
        registry.register(connector.clone());
        (SeriesRepository::new(registry), connector)
    }

    fn params() -> SessionParams {
        SessionParams::new("mem", "BTC/USDT", Timeframe::Minute1)
            .with_strategy(StrategyParams::EmaCrossover(EmaCrossoverConfig {
                fast_period: 2,
                slow_period: 3,
            }))
            .with_history_limit(20)
            .with_window(5)
    }

    #[tokio::test]
    async fn test_load() {
        let (repo, _) = repository(MemoryConnector::new("mem").with_history("BTC/USDT", rising(30)));
        let mut session = Session::new(params());

        let snapshot = session.load(&repo).await.unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(snapshot.len(), 20);
        assert_eq!(snapshot.strategy(), "ema_crossover");
    }

    #[tokio::test]
    async fn test_failed_load_stays_idle() {
        let (repo, _) = repository(MemoryConnector::new("mem").with_history("BTC/USDT", rising(30)));
        let mut session = Session::new(SessionParams::new("mem", "FOO/BAR", Timeframe::Minute1));

        let err = session.load(&repo).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSymbol);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.snapshot().is_none());

        session.reset("mem", "BTC/USDT", Timeframe::Minute1).await;
        assert!(session.load(&repo).await.is_ok());
    }

    #[tokio::test]
    async fn test_tick_while_idle_is_invalid() {
        let mut session = Session::new(params());

        let err = session.tick(TICK).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_streaming_keeps_window() {
        let live: Vec<_> = (30..40).map(|i| Ok(bar(i, 130.0 + i as f64))).collect();
        let (repo, _) = repository(
            MemoryConnector::new("mem")
                .with_history("BTC/USDT", rising(30))
                .with_live("BTC/USDT", live),
        );
        let mut session = Session::new(params());
        session.load(&repo).await.unwrap();

        let snapshot = session.start_streaming(&repo).await.unwrap();
        assert_eq!(session.state(), SessionState::Streaming);
        assert_eq!(snapshot.len(), 5);

        let mut last = snapshot;
        for _ in 0..10 {
            let outcome = session.tick(TICK).await.unwrap();
            assert!(outcome.is_updated());
            last = outcome.into_snapshot();
        }

        let expected: Vec<i64> = (35..40).map(|i| i * 60_000).collect();
        assert_eq!(last.len(), 5);
        assert_eq!(last.series().timestamps(), expected);
        assert_eq!(last.column("ema_fast").unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_zero_window_is_rejected() {
        let live: Vec<_> = (10..60).map(|i| Ok(bar(i, 100.0 + i as f64))).collect();
        let (repo, _) = repository(
            MemoryConnector::new("mem")
                .with_history("BTC/USDT", rising(10))
                .with_live("BTC/USDT", live),
        );
        let mut session = Session::new(params().with_window(0));
        session.load(&repo).await.unwrap();

        let err = session.start_streaming(&repo).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.snapshot().unwrap().len(), 10);
        assert!(session.tick(TICK).await.is_err());
    }

    #[tokio::test]
    async fn test_forming_candle_is_replaced() {
        let (repo, _) = repository(
            MemoryConnector::new("mem")
                .with_history("BTC/USDT", rising(10))
                .with_live("BTC/USDT", vec![Ok(bar(9, 500.0)), Ok(bar(3, 1.0))]),
        );
        let mut session = Session::new(params());
        session.load(&repo).await.unwrap();
        session.start_streaming(&repo).await.unwrap();

        let updated = session.tick(TICK).await.unwrap();
        assert!(updated.is_updated());
        assert_eq!(updated.snapshot().len(), 5);
        assert!((updated.snapshot().series().last().unwrap().close - 500.0).abs() < 1e-10);

        let stale = session.tick(TICK).await.unwrap();
        assert!(!stale.is_updated());
        assert!(Arc::ptr_eq(stale.snapshot(), updated.snapshot()));
    }

    #[tokio::test]
    async fn test_timeout_reemits_snapshot() {
        let (repo, _) = repository(MemoryConnector::new("mem").with_history("BTC/USDT", rising(10)));
        let mut session = Session::new(params());
        session.load(&repo).await.unwrap();
        let started = session.start_streaming(&repo).await.unwrap();

        let outcome = session.tick(Duration::from_millis(10)).await.unwrap();
        assert!(!outcome.is_updated());
        assert!(Arc::ptr_eq(outcome.snapshot(), &started));
        assert_eq!(session.state(), SessionState::Streaming);
    }

    #[tokio::test]
    async fn test_feed_error_falls_back_to_loaded() {
        let (repo, _) = repository(
            MemoryConnector::new("mem")
                .with_history("BTC/USDT", rising(10))
                .with_live("BTC/USDT", vec![Err(DataError::upstream("connection reset"))]),
        );
        let mut session = Session::new(params());
        session.load(&repo).await.unwrap();
        session.start_streaming(&repo).await.unwrap();

        let err = session.tick(TICK).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(session.snapshot().is_some());

        // Still callable: streaming can be restarted.
        session.start_streaming(&repo).await.unwrap();
        assert_eq!(session.state(), SessionState::Streaming);
        session.stop_streaming().await.unwrap();
    }

    #[tokio::test]
    async fn test_streaming_unsupported() {
        let (repo, _) = repository(
            MemoryConnector::new("mem")
                .with_history("BTC/USDT", rising(10))
                .without_streaming(),
        );
        let mut session = Session::new(params());
        session.load(&repo).await.unwrap();

        let err = session.start_streaming(&repo).await.unwrap_err();
        assert!(matches!(
            err,
            signal_core::SignalError::Session(SessionError::StreamingUnsupported { .. })
        ));
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[tokio::test]
    async fn test_stop_streaming() {
        let (repo, _) = repository(MemoryConnector::new("mem").with_history("BTC/USDT", rising(10)));
        let mut session = Session::new(params());

        assert!(session.stop_streaming().await.is_err());
        session.load(&repo).await.unwrap();
        session.start_streaming(&repo).await.unwrap();
        session.stop_streaming().await.unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert!(session.tick(TICK).await.is_err());
    }

    #[tokio::test]
    async fn test_set_strategy_does_not_refetch() {
        let (repo, connector) =
            repository(MemoryConnector::new("mem").with_history("BTC/USDT", rising(30)));
        let mut session = Session::new(params());
        session.load(&repo).await.unwrap();
        let fetches = connector.fetch_count();

        let snapshot = session
            .set_strategy(StrategyParams::Rsi(RsiConfig { period: 14 }))
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.strategy(), "rsi");
        assert_eq!(snapshot.len(), 20);
        assert_eq!(connector.fetch_count(), fetches);

        let err = session
            .set_strategy(StrategyParams::Rsi(RsiConfig { period: 0 }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(session.snapshot().unwrap().strategy(), "rsi");
    }

    #[tokio::test]
    async fn test_reset_closes_feed() {
        let (repo, _) = repository(MemoryConnector::new("mem").with_history("BTC/USDT", rising(10)));
        let mut session = Session::new(params());
        session.load(&repo).await.unwrap();
        session.start_streaming(&repo).await.unwrap();

        session.reset("mem", "ETH/USDT", Timeframe::Hour1).await;
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.snapshot().is_none());
        assert_eq!(session.params().symbol, "ETH/USDT");
    }
}
