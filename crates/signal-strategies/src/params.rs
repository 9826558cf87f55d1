//! Strategy selection.

use serde::{Deserialize, Serialize};
use signal_core::{
    error::IndicatorError,
    traits::Strategy,
    types::{AnnotatedSeries, BarSeries, Timeframe},
};

use crate::{EmaCrossoverConfig, MacdConfig, RsiConfig};

/// One of the supported strategies together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyParams {
    EmaCrossover(EmaCrossoverConfig),
    Macd(MacdConfig),
    Rsi(RsiConfig),
}

impl StrategyParams {
    /// Default strategy for a timeframe: EMA crossover on 1m, MACD on 1h,
    /// RSI otherwise.
    pub fn default_for(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::Minute1 => StrategyParams::EmaCrossover(EmaCrossoverConfig::default()),
            Timeframe::Hour1 => StrategyParams::Macd(MacdConfig::default()),
            _ => StrategyParams::Rsi(RsiConfig::default()),
        }
    }

    fn inner(&self) -> &dyn Strategy {
        match self {
            StrategyParams::EmaCrossover(config) => config,
            StrategyParams::Macd(config) => config,
            StrategyParams::Rsi(config) => config,
        }
    }

    /// Short human-readable description of the parameters.
    pub fn describe(&self) -> String {
        match self {
            StrategyParams::EmaCrossover(c) => {
                format!("EMA crossover ({}/{})", c.fast_period, c.slow_period)
            }
            StrategyParams::Macd(c) => format!(
                "MACD ({}/{}/{})",
                c.fast_period, c.slow_period, c.signal_period
            ),
            StrategyParams::Rsi(c) => format!("RSI ({})", c.period),
        }
    }
}

impl Strategy for StrategyParams {
    fn key(&self) -> &'static str {
        self.inner().key()
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        self.inner().validate()
    }

    fn apply(&self, series: &BarSeries) -> Result<AnnotatedSeries, IndicatorError> {
        self.inner().apply(series)
    }
}
