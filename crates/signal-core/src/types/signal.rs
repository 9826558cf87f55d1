//! Discrete trade signals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-bar trade signal: -1 sell, 0 hold, 1 buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Sell,
    #[default]
    Hold,
    Buy,
}

impl Signal {
    /// Buy when `a > b`, sell when `a < b`, hold when equal or either is NaN.
    #[inline]
    pub fn from_comparison(a: f64, b: f64) -> Self {
        if a > b {
            Signal::Buy
        } else if a < b {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    /// Numeric value of the signal.
    pub fn value(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Sell),
            0 => Ok(Signal::Hold),
            1 => Ok(Signal::Buy),
            other => Err(format!("Invalid signal value: {}", other)),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Sell => "sell",
            Signal::Hold => "hold",
            Signal::Buy => "buy",
        };
        write!(f, "{}", s)
    }
}
