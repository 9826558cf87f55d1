//! Session orchestration for the candle signal pipeline.
//!
//! A [`Session`] moves through `Idle -> Loaded -> Streaming`: it loads
//! history, annotates it with the selected strategy and, on request, keeps a
//! rolling window current from a live feed. [`drive`] runs the streaming loop
//! and hands snapshots to a presentation layer over a channel.

mod driver;
mod session;
mod state;

pub use driver::drive;
pub use session::Session;
pub use state::{SessionParams, SessionState, TickOutcome};
