//! RSI Strategy.
//!
//! Buys when RSI is below the oversold level and sells when it is above the
//! overbought level.

use serde::{Deserialize, Serialize};
use signal_core::{
    error::IndicatorError,
    traits::{closes_of, validate_period, Indicator, Strategy},
    types::{AnnotatedSeries, BarSeries, Column, Signal},
};
use signal_indicators::Rsi;
use tracing::debug;

/// Buy below this RSI level.
pub const OVERSOLD: f64 = 30.0;
/// Sell above this RSI level.
pub const OVERBOUGHT: f64 = 70.0;

/// Configuration for the RSI strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsiConfig {
    /// RSI calculation period
    pub period: usize,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// Map one RSI value to a signal; NaN holds.
fn classify(rsi: f64) -> Signal {
    if rsi < OVERSOLD {
        Signal::Buy
    } else if rsi > OVERBOUGHT {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

impl Strategy for RsiConfig {
    fn key(&self) -> &'static str {
        "rsi"
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        validate_period("RSI", self.period)?;
        Ok(())
    }

    fn apply(&self, series: &BarSeries) -> Result<AnnotatedSeries, IndicatorError> {
        self.validate()?;
        let closes = closes_of(series)?;

        let rsi = Rsi::new(self.period)?.calculate(&closes);
        let signals = rsi.iter().map(|&value| classify(value)).collect();

        debug!(bars = closes.len(), period = self.period, "RSI applied");

        Ok(AnnotatedSeries::new(
            series.clone(),
            self.key(),
            vec![Column::new("rsi", rsi)],
            signals,
        ))
    }
}

/// Apply the RSI strategy with the given period.
pub fn rsi_signal(series: &BarSeries, period: usize) -> Result<AnnotatedSeries, IndicatorError> {
    RsiConfig { period }.apply(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_closes;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(29.99), Signal::Buy);
        assert_eq!(classify(30.0), Signal::Hold);
        assert_eq!(classify(50.0), Signal::Hold);
        assert_eq!(classify(70.0), Signal::Hold);
        assert_eq!(classify(70.01), Signal::Sell);
        assert_eq!(classify(f64::NAN), Signal::Hold);
    }

    #[test]
    fn test_signals_follow_rsi_bands() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i % 3) as f64)
            .collect();
        let annotated = rsi_signal(&series_from_closes(&closes), 14).unwrap();

        let rsi = annotated.column("rsi").unwrap();
        assert!(rsi[..13].iter().all(|v| v.is_nan()));
        for (i, signal) in annotated.signals().iter().enumerate() {
            let expected = if rsi[i] < 30.0 {
                Signal::Buy
            } else if rsi[i] > 70.0 {
                Signal::Sell
            } else {
                Signal::Hold
            };
            assert_eq!(*signal, expected, "bar {}", i);
        }
    }

    #[test]
    fn test_falling_prices_are_oversold() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let annotated = rsi_signal(&series_from_closes(&closes), 5).unwrap();
        assert_eq!(annotated.latest_signal(), Some(Signal::Buy));
    }

    #[test]
    fn test_rising_prices_are_overbought() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let annotated = rsi_signal(&series_from_closes(&closes), 5).unwrap();
        assert_eq!(annotated.latest_signal(), Some(Signal::Sell));
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let closes: Vec<f64> = (0..90).map(|i| 40.0 + ((i * 7) % 11) as f64).collect();
        let first = rsi_signal(&series_from_closes(&closes), 14).unwrap();
        let second = rsi_signal(first.series(), 14).unwrap();

        assert_eq!(first.signals(), second.signals());
        for (a, b) in first.columns().iter().zip(second.columns()) {
            assert_eq!(a.name, b.name);
            for (x, y) in a.values.iter().zip(b.values.iter()) {
                assert!(x.to_bits() == y.to_bits());
            }
        }
    }

    #[test]
    fn test_zero_period_fails() {
        let result = rsi_signal(&series_from_closes(&[1.0]), 0);
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }
}
