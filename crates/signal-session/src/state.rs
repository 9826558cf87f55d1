//! Session parameters, lifecycle state and tick results.

use serde::{Deserialize, Serialize};
use signal_core::types::{AnnotatedSeries, Timeframe};
use signal_strategies::StrategyParams;
use std::fmt;
use std::sync::Arc;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// History fetched and annotated.
    Loaded,
    /// A live feed is updating the rolling window.
    Streaming,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loaded => "loaded",
            SessionState::Streaming => "streaming",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a session watches and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Exchange id
    pub exchange: String,
    /// Unified symbol, e.g. `BTC/USDT`
    pub symbol: String,
    /// Bar timeframe
    pub timeframe: Timeframe,
    /// Explicit strategy; the timeframe default applies when unset
    pub strategy: Option<StrategyParams>,
    /// Bars fetched on load
    pub history_limit: usize,
    /// Bars retained while streaming
    pub window: usize,
}

impl SessionParams {
    pub fn new(exchange: impl Into<String>, symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
            timeframe,
            strategy: None,
            history_limit: 500,
            window: 100,
        }
    }

    pub fn with_strategy(mut self, strategy: StrategyParams) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Strategy in effect.
    pub fn effective_strategy(&self) -> StrategyParams {
        self.strategy
            .unwrap_or_else(|| StrategyParams::default_for(self.timeframe))
    }
}

/// Result of one streaming step.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// A bar arrived and the annotation was recomputed.
    Updated(Arc<AnnotatedSeries>),
    /// No bar within the idle timeout, or only a stale one; the previous
    /// snapshot is re-emitted.
    Unchanged(Arc<AnnotatedSeries>),
}

impl TickOutcome {
    pub fn snapshot(&self) -> &Arc<AnnotatedSeries> {
        match self {
            TickOutcome::Updated(s) | TickOutcome::Unchanged(s) => s,
        }
    }

    pub fn into_snapshot(self) -> Arc<AnnotatedSeries> {
        match self {
            TickOutcome::Updated(s) | TickOutcome::Unchanged(s) => s,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, TickOutcome::Updated(_))
    }
}
