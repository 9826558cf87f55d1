//! Technical indicators aligned index-for-index with their input.
//!
//! This crate provides the indicators behind the signal strategies:
//! - Exponential moving average (EMA)
//! - Momentum indicators (RSI with Wilder smoothing, MACD)
//!
//! Every indicator returns one value per input point. Leading values whose
//! lookback window is not yet satisfied are `f64::NAN`.

pub mod momentum;
pub mod moving_average;

pub use momentum::{Macd, MacdOutput, Rsi};
pub use moving_average::Ema;
