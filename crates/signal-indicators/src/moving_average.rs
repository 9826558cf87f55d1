//! Moving average indicators.

use signal_core::error::IndicatorError;
use signal_core::traits::{validate_period, Indicator};

/// Recursive exponential smoothing seeded with the first value.
///
/// Written as `prev + alpha * (x - prev)` so a constant input stays exactly
/// constant.
pub(crate) fn smooth(data: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(data.len());
    let mut iter = data.iter();

    if let Some(&first) = iter.next() {
        let mut avg = first;
        result.push(avg);
        for &value in iter {
            avg += alpha * (value - avg);
            result.push(avg);
        }
    }

    result
}

/// Exponential Moving Average (EMA).
///
/// Smoothing factor `2 / (period + 1)`, seeded with the first defined input.
/// Leading NaN inputs are skipped, and the first `period - 1` defined inputs
/// produce NaN.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    alpha: f64,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let period = validate_period("EMA", period)?;
        let alpha = 2.0 / (period as f64 + 1.0);
        Ok(Self { period, alpha })
    }

    /// Smoothing factor.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let start = data.iter().position(|v| !v.is_nan()).unwrap_or(data.len());
        let mut result = vec![f64::NAN; data.len()];

        let smoothed = smooth(&data[start..], self.alpha);
        for (i, value) in smoothed.into_iter().enumerate().skip(self.period - 1) {
            result[start + i] = value;
        }

        result
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn name(&self) -> &str {
        "EMA"
    }
}
