//! Logging and text output for the candle signal pipeline.

mod logging;
mod render;

pub use logging::setup_logging;
pub use render::{render_summary, render_table};
