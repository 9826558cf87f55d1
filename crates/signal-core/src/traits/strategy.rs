//! Strategy trait definitions.

use crate::error::IndicatorError;
use crate::types::{AnnotatedSeries, BarSeries};

/// A signal strategy: a pure transform from a bar series to an annotated view.
///
/// Implementations never mutate the input and recompute every column from
/// scratch, so applying a strategy twice to the same bars yields identical
/// output.
pub trait Strategy: Send + Sync {
    /// Stable registry key, e.g. `"ema_crossover"`.
    fn key(&self) -> &'static str;

    /// Check the strategy parameters.
    fn validate(&self) -> Result<(), IndicatorError>;

    /// Compute indicator columns and per-bar signals over the whole series.
    fn apply(&self, series: &BarSeries) -> Result<AnnotatedSeries, IndicatorError>;
}

/// Close prices of a non-empty series.
pub fn closes_of(series: &BarSeries) -> Result<Vec<f64>, IndicatorError> {
    if series.is_empty() {
        return Err(IndicatorError::EmptySeries);
    }
    Ok(series.closes())
}
