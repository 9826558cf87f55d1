//! Core types and traits for the candle signal pipeline.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Timeframe)
//! - Indicator annotations and discrete trade signals
//! - The live bar subscription handle
//! - Core traits for indicators and exchange connectors

pub mod error;
pub mod subscription;
pub mod traits;
pub mod types;

pub use error::{DataError, ErrorKind, IndicatorError, SessionError, SignalError, SignalResult};
pub use subscription::Subscription;
pub use traits::*;
pub use types::*;
