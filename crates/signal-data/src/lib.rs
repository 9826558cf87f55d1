//! Market data for the candle signal pipeline.
//!
//! Public REST and WebSocket connectors for Binance, Binance US, Bybit and
//! Kraken behind the [`SeriesRepository`], plus CSV export of results.

mod binance;
mod bybit;
mod cache;
mod csv_export;
mod http;
mod kraken;
mod memory;
mod registry;
mod repository;
pub mod symbol;
mod ws;

pub use binance::BinanceConnector;
pub use bybit::BybitConnector;
pub use cache::SymbolCache;
pub use csv_export::{save_csv, write_csv};
pub use kraken::KrakenConnector;
pub use memory::MemoryConnector;
pub use registry::{ConnectorSettings, ExchangeRegistry};
pub use repository::SeriesRepository;
