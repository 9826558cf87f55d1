//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signal-desk")]
#[command(author, version, about = "Crypto candlestick signals from EMA, MACD and RSI")]
pub struct Cli {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long, env = "SIGNALS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level, overrides the configured one
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn at_least_one(text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List supported exchanges
    Exchanges,
    /// List tradable symbols on an exchange
    Symbols(SymbolsArgs),
    /// List available strategies
    Strategies,
    /// Fetch history and annotate it with a strategy
    History(HistoryArgs),
    /// Load history, then keep it current from the live feed
    Stream(StreamArgs),
    /// Validate configuration
    ValidateConfig,
    /// Print the effective configuration as TOML
    PrintConfig,
}

/// Market and strategy selection shared by `history` and `stream`.
#[derive(clap::Args)]
pub struct MarketArgs {
    /// Exchange id (defaults to exchanges.default_exchange)
    #[arg(short, long)]
    pub exchange: Option<String>,

    /// Unified symbol such as BTC/USDT
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Timeframe: 1m, 5m, 15m, 30m, 1h, 4h, 1d, 1w, 1M
    #[arg(short, long)]
    pub timeframe: Option<String>,

    /// Strategy key (ema_crossover, macd, rsi)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Strategy parameters as JSON, e.g. '{"period": 9}'
    #[arg(long, requires = "strategy")]
    pub strategy_config: Option<String>,

    /// Bars of history to fetch
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(clap::Args)]
pub struct SymbolsArgs {
    /// Exchange id (defaults to exchanges.default_exchange)
    pub exchange: Option<String>,

    /// Only symbols quoted in this asset, e.g. USDT
    #[arg(short, long)]
    pub quote: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Rows shown in the text table
    #[arg(long, default_value = "20")]
    pub rows: usize,

    /// Save the annotated series to a CSV file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct StreamArgs {
    #[command(flatten)]
    pub market: MarketArgs,

    /// Streaming ticks to run (defaults to session.stream_iterations)
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Milliseconds one tick waits for a bar
    #[arg(long)]
    pub idle_timeout_ms: Option<u64>,

    /// Bars retained while streaming
    #[arg(long, value_parser = at_least_one)]
    pub window: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the final window to a CSV file
    #[arg(long)]
    pub save: Option<PathBuf>,
}
