//! Signal strategy implementations.
//!
//! This crate provides the three strategies of the indicator engine:
//! - EMA crossover
//! - MACD vs. signal line
//! - RSI overbought/oversold
//!
//! Each is a pure transform from a `BarSeries` to an `AnnotatedSeries`.

mod ema_crossover;
mod macd;
mod params;
mod registry;
mod rsi_strategy;

pub use ema_crossover::{ema_crossover, EmaCrossoverConfig};
pub use macd::{macd_signal, MacdConfig};
pub use params::StrategyParams;
pub use registry::{StrategyInfo, StrategyRegistry};
pub use rsi_strategy::{rsi_signal, RsiConfig, OVERBOUGHT, OVERSOLD};
pub use signal_core::traits::Strategy;

#[cfg(test)]
pub(crate) mod test_support {
    use signal_core::types::{Bar, BarSeries, Timeframe};

    /// One-minute series with the given closes.
    pub fn series_from_closes(closes: &[f64]) -> BarSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &price)| Bar::new(i as i64 * 60_000, price, price + 1.0, price - 1.0, price, 1000.0))
            .collect();
        BarSeries::from_bars("TEST/USDT", Timeframe::Minute1, bars)
    }
}
