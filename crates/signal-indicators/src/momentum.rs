//! Momentum indicators.

use serde::{Deserialize, Serialize};
use signal_core::error::IndicatorError;
use signal_core::traits::{validate_period, Indicator};

use crate::moving_average::{smooth, Ema};

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: validate_period("RSI", period)?,
        })
    }
}

impl Indicator for Rsi {
    type Output = f64;

    /// Wilder smoothing (alpha = 1/period) of gains and losses.
    ///
    /// The first price change is taken as zero so both averages are seeded
    /// at the first bar; the first `period - 1` values are NaN.
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut gains = Vec::with_capacity(data.len());
        let mut losses = Vec::with_capacity(data.len());

        for i in 0..data.len() {
            let change = if i == 0 { 0.0 } else { data[i] - data[i - 1] };
            if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        let alpha = 1.0 / self.period as f64;
        let avg_gains = smooth(&gains, alpha);
        let avg_losses = smooth(&losses, alpha);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .enumerate()
            .map(|(i, (&gain, &loss))| {
                if i + 1 < self.period {
                    f64::NAN
                } else if loss == 0.0 {
                    100.0
                } else {
                    100.0 - (100.0 / (1.0 + gain / loss))
                }
            })
            .collect()
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    slow_warmup: usize,
}

impl Macd {
    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        let fast_ema = Ema::new(validate_period("MACD fast", fast)?)?;
        let slow_ema = Ema::new(validate_period("MACD slow", slow)?)?;
        let signal_ema = Ema::new(validate_period("MACD signal", signal)?)?;
        Ok(Self {
            fast: fast_ema,
            slow: slow_ema,
            signal: signal_ema,
            slow_warmup: fast.max(slow) - 1,
        })
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        let fast = self.fast.calculate(data);
        let slow = self.slow.calculate(data);

        // NaN until both EMAs are defined.
        let macd_line: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();

        // Signal EMA starts at the first defined MACD value.
        let signal_line = self.signal.calculate(&macd_line);

        macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn warmup(&self) -> usize {
        self.slow_warmup + self.signal.warmup()
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_basic() {
        let rsi = Rsi::new(14).unwrap();
        // Generate test data with alternating up/down moves
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();

        let result = rsi.calculate(&data);
        assert_eq!(result.len(), data.len());
        assert!(result[..13].iter().all(|v| v.is_nan()));

        // All defined RSI values should be between 0 and 100
        for value in &result[13..] {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let rsi = Rsi::new(5).unwrap();
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let result = rsi.calculate(&data);

        // All gains = RSI should be 100
        assert!((result[4] - 100.0).abs() < 1e-10);
        assert!((result[6] - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = Rsi::new(5).unwrap();
        let data = vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let result = rsi.calculate(&data);

        // All losses = RSI should be 0
        assert!(result[4].abs() < 1e-10);
        assert!(result[6].abs() < 1e-10);
    }

    #[test]
    fn test_rsi_wilder_values() {
        let rsi = Rsi::new(2).unwrap();
        // changes: 0, +2, -1; alpha = 0.5
        // avg gains: 0, 1, 0.5   avg losses: 0, 0, 0.5
        let result = rsi.calculate(&[10.0, 12.0, 11.0]);

        assert!(result[0].is_nan());
        assert!((result[1] - 100.0).abs() < 1e-10);
        assert!((result[2] - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_rejects_zero_period() {
        assert!(Rsi::new(0).is_err());
    }

    #[test]
    fn test_macd_uptrend() {
        let macd = Macd::with_periods(12, 26, 9).unwrap();
        let data: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = macd.calculate(&data);

        assert_eq!(result.len(), 50);
        // In an uptrend, MACD should be positive
        assert!(result.last().unwrap().macd > 0.0);
    }

    #[test]
    fn test_macd_warmup_alignment() {
        let macd = Macd::with_periods(5, 10, 3).unwrap();
        let data: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = macd.calculate(&data);

        assert_eq!(macd.warmup(), 11);
        assert!(result[8].macd.is_nan());
        assert!(!result[9].macd.is_nan());
        assert!(result[10].signal.is_nan());
        assert!(!result[11].signal.is_nan());
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let macd = Macd::with_periods(12, 26, 9).unwrap();
        let result = macd.calculate(&[250.0; 60]);

        for output in &result[macd.warmup()..] {
            assert_eq!(output.macd, 0.0);
            assert_eq!(output.signal, 0.0);
            assert_eq!(output.histogram, 0.0);
        }
    }

    #[test]
    fn test_macd_rejects_zero_period() {
        assert!(Macd::with_periods(0, 26, 9).is_err());
        assert!(Macd::with_periods(12, 26, 0).is_err());
    }
}
