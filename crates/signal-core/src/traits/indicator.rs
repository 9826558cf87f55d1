//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for technical indicators over a price sequence.
///
/// Outputs are aligned index-for-index with the input: `calculate` returns
/// exactly one value per input point, undefined (NaN) while the lookback
/// window is not yet satisfied.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Number of leading outputs that are undefined.
    fn warmup(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Check that a lookback period is at least 1.
pub fn validate_period(name: &str, period: usize) -> Result<usize, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} period must be at least 1",
            name
        )));
    }
    Ok(period)
}
