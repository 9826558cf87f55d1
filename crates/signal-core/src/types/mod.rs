//! Core data types for the signal pipeline.

mod annotated;
mod ohlcv;
mod signal;
mod timeframe;

pub use annotated::{AnnotatedSeries, Column, SignalCounts};
pub use ohlcv::{Bar, BarSeries, PushOutcome};
pub use signal::Signal;
pub use timeframe::Timeframe;
