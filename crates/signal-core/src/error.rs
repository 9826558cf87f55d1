//! Error types for the signal pipeline.

use thiserror::Error;

/// Top-level pipeline error.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SignalError {
    /// Flat classification of the error, independent of which layer raised it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignalError::Data(e) => e.kind(),
            SignalError::Indicator(e) => e.kind(),
            SignalError::Session(_) => ErrorKind::InvalidState,
            SignalError::Config(_) | SignalError::Io(_) | SignalError::Serialization(_) => {
                ErrorKind::Other
            }
        }
    }
}

/// Flat error taxonomy exposed to callers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownExchange,
    InvalidSymbol,
    InvalidParameter,
    EmptySeries,
    UpstreamError,
    StreamClosed,
    InvalidState,
    Other,
}

/// Market data errors raised by the series repository and exchange connectors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("Invalid symbol {symbol}: {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("Invalid history limit: {0}")]
    InvalidLimit(usize),

    /// Network, HTTP, rate-limit, geo-restriction and payload failures alike.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Stream closed")]
    StreamClosed,
}

impl DataError {
    /// Build an `InvalidSymbol` error.
    pub fn invalid_symbol(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        DataError::InvalidSymbol {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Build an `Upstream` error from anything displayable.
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        DataError::Upstream(err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::UnknownExchange(_) => ErrorKind::UnknownExchange,
            DataError::InvalidSymbol { .. } => ErrorKind::InvalidSymbol,
            DataError::InvalidLimit(_) => ErrorKind::InvalidParameter,
            DataError::Upstream(_) => ErrorKind::UpstreamError,
            DataError::StreamClosed => ErrorKind::StreamClosed,
        }
    }
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Series has no bars")]
    EmptySeries,
}

impl IndicatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndicatorError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            IndicatorError::EmptySeries => ErrorKind::EmptySeries,
        }
    }
}

/// Session lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Live updates are not available for {exchange} {timeframe}")]
    StreamingUnsupported { exchange: String, timeframe: String },
}

/// Result type alias for pipeline operations.
pub type SignalResult<T> = Result<T, SignalError>;
