//! MACD Strategy.
//!
//! Buy while the MACD line is above its signal line, sell while below.

use serde::{Deserialize, Serialize};
use signal_core::{
    error::IndicatorError,
    traits::{closes_of, validate_period, Indicator, Strategy},
    types::{AnnotatedSeries, BarSeries, Column, Signal},
};
use signal_indicators::Macd;
use tracing::debug;

/// Configuration for the MACD strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdConfig {
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period
    pub slow_period: usize,
    /// Signal line EMA period
    pub signal_period: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Strategy for MacdConfig {
    fn key(&self) -> &'static str {
        "macd"
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        validate_period("Fast MACD", self.fast_period)?;
        validate_period("Slow MACD", self.slow_period)?;
        validate_period("Signal MACD", self.signal_period)?;
        Ok(())
    }

    fn apply(&self, series: &BarSeries) -> Result<AnnotatedSeries, IndicatorError> {
        self.validate()?;
        let closes = closes_of(series)?;

        let outputs = Macd::with_periods(self.fast_period, self.slow_period, self.signal_period)?
            .calculate(&closes);

        let macd: Vec<f64> = outputs.iter().map(|o| o.macd).collect();
        let signal_line: Vec<f64> = outputs.iter().map(|o| o.signal).collect();
        let signals = outputs
            .iter()
            .map(|o| Signal::from_comparison(o.macd, o.signal))
            .collect();

        debug!(bars = closes.len(), "MACD applied");

        Ok(AnnotatedSeries::new(
            series.clone(),
            self.key(),
            vec![Column::new("macd", macd), Column::new("signal_line", signal_line)],
            signals,
        ))
    }
}

/// Apply the MACD strategy with the given periods.
pub fn macd_signal(
    series: &BarSeries,
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<AnnotatedSeries, IndicatorError> {
    MacdConfig {
        fast_period,
        slow_period,
        signal_period,
    }
    .apply(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_closes;

    #[test]
    fn test_flat_series_holds() {
        let annotated = macd_signal(&series_from_closes(&[100.0; 80]), 12, 26, 9).unwrap();

        let macd = annotated.column("macd").unwrap();
        let signal_line = annotated.column("signal_line").unwrap();
        for i in 33..80 {
            assert_eq!(macd[i], 0.0);
            assert_eq!(signal_line[i], 0.0);
        }
        assert!(annotated.signals().iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn test_signal_follows_macd_vs_signal_line() {
        let closes: Vec<f64> = (0..150)
            .map(|i| 200.0 + (i as f64 * 0.15).sin() * 12.0)
            .collect();
        let annotated = macd_signal(&series_from_closes(&closes), 12, 26, 9).unwrap();

        let macd = annotated.column("macd").unwrap();
        let signal_line = annotated.column("signal_line").unwrap();
        for (i, signal) in annotated.signals().iter().enumerate() {
            if signal_line[i].is_nan() {
                assert_eq!(*signal, Signal::Hold);
            } else if macd[i] > signal_line[i] {
                assert_eq!(*signal, Signal::Buy);
            } else if macd[i] < signal_line[i] {
                assert_eq!(*signal, Signal::Sell);
            }
        }
        let counts = annotated.signal_counts();
        assert!(counts.buy > 0 && counts.sell > 0);
    }

    #[test]
    fn test_warmup_rows_are_undefined() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + i as f64).collect();
        let annotated = macd_signal(&series_from_closes(&closes), 12, 26, 9).unwrap();

        let macd = annotated.column("macd").unwrap();
        let signal_line = annotated.column("signal_line").unwrap();
        assert!(macd[24].is_nan());
        assert!(!macd[25].is_nan());
        assert!(signal_line[32].is_nan());
        assert!(!signal_line[33].is_nan());
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 80.0 + (i as f64 * 0.3).cos() * 6.0)
            .collect();
        let first = macd_signal(&series_from_closes(&closes), 12, 26, 9).unwrap();
        let second = macd_signal(first.series(), 12, 26, 9).unwrap();

        assert_eq!(first.signals(), second.signals());
        for (a, b) in first.columns().iter().zip(second.columns()) {
            assert_eq!(a.name, b.name);
            for (x, y) in a.values.iter().zip(b.values.iter()) {
                assert!(x.to_bits() == y.to_bits());
            }
        }
    }

    #[test]
    fn test_invalid_period() {
        let result = macd_signal(&series_from_closes(&[1.0, 2.0]), 12, 26, 0);
        assert!(matches!(result, Err(IndicatorError::InvalidParameter(_))));
    }
}
