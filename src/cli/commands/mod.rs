//! CLI command implementations.

pub mod config;
pub mod exchanges;
pub mod history;
pub mod stream;
pub mod strategies;
pub mod symbols;
pub mod validate;

use anyhow::{Context, Result};
use signal_config::AppConfig;
use signal_core::types::{AnnotatedSeries, Timeframe};
use signal_data::SeriesRepository;
use signal_session::SessionParams;
use signal_strategies::StrategyRegistry;
use std::str::FromStr;
use tracing::warn;

use crate::cli::MarketArgs;

/// Repository over the built-in exchanges, configured from `config`.
pub fn repository(config: &AppConfig) -> Result<SeriesRepository> {
    SeriesRepository::with_defaults(config.exchanges.connector_settings())
        .context("Failed to create exchange connectors")
}

/// Session parameters from command-line arguments, falling back to the config.
pub fn session_params(config: &AppConfig, market: &MarketArgs) -> Result<SessionParams> {
    let exchange = market
        .exchange
        .clone()
        .unwrap_or_else(|| config.exchanges.default_exchange.clone());
    let symbol = market
        .symbol
        .clone()
        .unwrap_or_else(|| config.session.default_symbol.clone());
    let timeframe = match &market.timeframe {
        Some(text) => Timeframe::from_str(text).map_err(anyhow::Error::msg)?,
        None => config.session.default_timeframe,
    };

    let mut params = SessionParams::new(exchange, symbol, timeframe)
        .with_history_limit(market.limit.unwrap_or(config.session.history_limit))
        .with_window(config.session.window);

    let strategy = match &market.strategy {
        Some(key) => Some(strategy_from_args(key, market.strategy_config.as_deref())?),
        None => config.strategy,
    };
    if let Some(strategy) = strategy {
        params = params.with_strategy(strategy);
    }

    Ok(params)
}

fn strategy_from_args(
    key: &str,
    config_json: Option<&str>,
) -> Result<signal_strategies::StrategyParams> {
    let registry = StrategyRegistry::new();
    let params = match config_json {
        Some(text) => {
            let value: serde_json::Value =
                serde_json::from_str(text).context("Strategy config is not valid JSON")?;
            registry.create(key, value)
        }
        None => registry.create_default(key),
    };
    params.context("Failed to create strategy")
}

/// Warn when a unified symbol is missing from the exchange catalog.
///
/// Returns `false` only when the catalog loaded and lacks the symbol; an
/// unavailable catalog or a native symbol is left to the exchange to judge.
pub async fn check_symbol(repo: &SeriesRepository, params: &SessionParams) -> bool {
    if !params.symbol.contains('/') {
        return true;
    }
    let symbols = repo.list_symbols_or_empty(&params.exchange).await;
    if symbols.is_empty() || symbols.contains(&params.symbol.to_uppercase()) {
        return true;
    }
    warn!(
        "{} is not listed on {}; try `signal-desk symbols {}`",
        params.symbol, params.exchange, params.exchange
    );
    false
}

/// JSON text of an annotated series.
pub fn to_json(annotated: &AnnotatedSeries) -> Result<String> {
    serde_json::to_string(annotated).context("Failed to serialize series")
}
