//! Core traits for the signal pipeline.

mod exchange;
mod indicator;
mod strategy;

pub use exchange::ExchangeConnector;
pub use indicator::{validate_period, Indicator};
pub use strategy::{closes_of, Strategy};
