//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::Timeframe;

/// One candlestick observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds (bar open time)
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume in base units
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check that high/low bound the open and close and volume is non-negative.
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close).max(self.low)
            && self.low <= self.open.min(self.close).min(self.high)
            && self.volume >= 0.0
    }

    /// Check if the bar is bullish (close > open).
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }
}

/// What happened to a bar pushed into a [`BarSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The bar is newer than the last one and was appended.
    Appended,
    /// The bar has the same open time as the last one and replaced it.
    Replaced,
    /// The bar is older than the last one and was dropped.
    Stale,
}

/// Time-ordered bars for one symbol and timeframe.
///
/// Timestamps are strictly increasing. When a capacity is set the oldest
/// bars are discarded first.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    /// Timeframe of the bars
    pub timeframe: Timeframe,
    bars: VecDeque<Bar>,
    /// Maximum length (0 = unlimited)
    capacity: usize,
}

impl BarSeries {
    /// Create a new empty bar series.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: VecDeque::new(),
            capacity: 0,
        }
    }

    /// Create a bar series with a maximum capacity.
    pub fn with_capacity(symbol: impl Into<String>, timeframe: Timeframe, capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a series from bars in any order.
    ///
    /// Bars are sorted by timestamp; for duplicate timestamps the one that
    /// came last in the input wins.
    pub fn from_bars(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        mut bars: Vec<Bar>,
    ) -> Self {
        // Stable sort keeps input order among equal timestamps.
        bars.sort_by_key(|b| b.timestamp);

        let mut deduped: VecDeque<Bar> = VecDeque::with_capacity(bars.len());
        for bar in bars {
            match deduped.back_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push_back(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            timeframe,
            bars: deduped,
            capacity: 0,
        }
    }

    /// Push a bar, keeping timestamps strictly increasing.
    pub fn push(&mut self, bar: Bar) -> PushOutcome {
        let outcome = match self.bars.back_mut() {
            Some(last) if bar.timestamp == last.timestamp => {
                *last = bar;
                PushOutcome::Replaced
            }
            Some(last) if bar.timestamp < last.timestamp => PushOutcome::Stale,
            _ => {
                self.bars.push_back(bar);
                PushOutcome::Appended
            }
        };
        self.enforce_capacity();
        outcome
    }

    /// Set the maximum length, discarding the oldest bars if already longer.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.enforce_capacity();
    }

    /// Drop all but the newest `n` bars.
    pub fn keep_last(&mut self, n: usize) {
        let excess = self.bars.len().saturating_sub(n);
        self.bars.drain(..excess);
    }

    fn enforce_capacity(&mut self) {
        if self.capacity > 0 {
            self.keep_last(self.capacity);
        }
    }

    /// Maximum length (0 = unlimited).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars.
    pub fn bars(&self) -> &VecDeque<Bar> {
        &self.bars
    }

    /// Get the first bar.
    pub fn first(&self) -> Option<&Bar> {
        self.bars.front()
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// Get a bar by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract timestamps as a vector.
    pub fn timestamps(&self) -> Vec<i64> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// Get an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }
}
