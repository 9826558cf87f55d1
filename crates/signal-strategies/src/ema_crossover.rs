//! EMA Crossover Strategy.
//!
//! Buy while the fast EMA of the close is above the slow EMA, sell while it
//! is below, hold where they are equal or either is still warming up.

use serde::{Deserialize, Serialize};
use signal_core::{
    error::IndicatorError,
    traits::{closes_of, validate_period, Indicator, Strategy},
    types::{AnnotatedSeries, BarSeries, Column, Signal},
};
use signal_indicators::Ema;
use tracing::debug;

/// Configuration for the EMA crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmaCrossoverConfig {
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period
    pub slow_period: usize,
}

impl Default for EmaCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 20,
        }
    }
}

impl Strategy for EmaCrossoverConfig {
    fn key(&self) -> &'static str {
        "ema_crossover"
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        validate_period("Fast EMA", self.fast_period)?;
        validate_period("Slow EMA", self.slow_period)?;
        Ok(())
    }

    fn apply(&self, series: &BarSeries) -> Result<AnnotatedSeries, IndicatorError> {
        self.validate()?;
        let closes = closes_of(series)?;

        let fast = Ema::new(self.fast_period)?.calculate(&closes);
        let slow = Ema::new(self.slow_period)?.calculate(&closes);

        let signals: Vec<Signal> = fast
            .iter()
            .zip(slow.iter())
            .map(|(&f, &s)| Signal::from_comparison(f, s))
            .collect();

        debug!(
            bars = closes.len(),
            fast = self.fast_period,
            slow = self.slow_period,
            "EMA crossover applied"
        );

        Ok(AnnotatedSeries::new(
            series.clone(),
            self.key(),
            vec![Column::new("ema_fast", fast), Column::new("ema_slow", slow)],
            signals,
        ))
    }
}

/// Apply the EMA crossover strategy with the given periods.
pub fn ema_crossover(
    series: &BarSeries,
    fast_period: usize,
    slow_period: usize,
) -> Result<AnnotatedSeries, IndicatorError> {
    EmaCrossoverConfig {
        fast_period,
        slow_period,
    }
    .apply(series)
}
