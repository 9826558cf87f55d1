//! Exchange connector trait definitions.

use crate::error::DataError;
use crate::subscription::Subscription;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Public market-data capability of one exchange.
///
/// Symbols are passed in unified `BASE/QUOTE` form; connectors translate to
/// the exchange's native naming.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Exchange identifier, e.g. `"binance"`.
    fn id(&self) -> &str;

    /// Whether the exchange has an interval code for this timeframe.
    fn supports_timeframe(&self, timeframe: Timeframe) -> bool;

    /// Whether a live bar feed exists for this timeframe.
    fn supports_streaming(&self, timeframe: Timeframe) -> bool {
        self.supports_timeframe(timeframe)
    }

    /// Fetch up to `limit` of the most recent bars.
    ///
    /// # Returns
    /// Bars as the exchange returned them; the repository normalizes order.
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError>;

    /// Open a live bar feed.
    async fn watch_ohlcv(&self, symbol: &str, timeframe: Timeframe)
        -> Result<Subscription, DataError>;

    /// Load the tradable symbol catalog as unified symbols.
    async fn load_markets(&self) -> Result<BTreeSet<String>, DataError>;
}
