//! Strategy registry for selecting strategies by name.

use crate::{EmaCrossoverConfig, MacdConfig, RsiConfig, StrategyParams};
use serde::{Deserialize, Serialize};
use signal_core::{error::IndicatorError, traits::Strategy};
use std::collections::BTreeMap;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry key
    pub key: String,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Indicator columns the strategy adds
    pub columns: Vec<String>,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry of the built-in strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

fn info<T: Serialize>(
    key: &str,
    name: &str,
    description: &str,
    columns: &[&str],
    default_config: T,
) -> StrategyInfo {
    StrategyInfo {
        key: key.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        default_config: serde_json::to_value(default_config).unwrap_or_default(),
    }
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let strategies = [
            info(
                "ema_crossover",
                "EMA Crossover",
                "Buy while the fast EMA is above the slow EMA, sell while below",
                &["ema_fast", "ema_slow"],
                EmaCrossoverConfig::default(),
            ),
            info(
                "macd",
                "MACD",
                "Buy while the MACD line is above its signal line, sell while below",
                &["macd", "signal_line"],
                MacdConfig::default(),
            ),
            info(
                "rsi",
                "RSI",
                "Buy when RSI is below 30 (oversold), sell when above 70 (overbought)",
                &["rsi"],
                RsiConfig::default(),
            ),
        ]
        .into_iter()
        .map(|info| (info.key.clone(), info))
        .collect();

        Self { strategies }
    }

    /// List all available strategies, ordered by key.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by key.
    pub fn get(&self, key: &str) -> Option<&StrategyInfo> {
        self.strategies.get(key)
    }

    /// Build strategy parameters from a key and a JSON configuration.
    pub fn create(
        &self,
        key: &str,
        config: serde_json::Value,
    ) -> Result<StrategyParams, IndicatorError> {
        let invalid = |e: serde_json::Error| IndicatorError::InvalidParameter(e.to_string());

        let params = match key {
            "ema_crossover" => StrategyParams::EmaCrossover(serde_json::from_value(config).map_err(invalid)?),
            "macd" => StrategyParams::Macd(serde_json::from_value(config).map_err(invalid)?),
            "rsi" => StrategyParams::Rsi(serde_json::from_value(config).map_err(invalid)?),
            _ => {
                return Err(IndicatorError::InvalidParameter(format!(
                    "Unknown strategy: {}",
                    key
                )))
            }
        };

        params.validate()?;
        Ok(params)
    }

    /// Build strategy parameters with the default configuration.
    pub fn create_default(&self, key: &str) -> Result<StrategyParams, IndicatorError> {
        let info = self.get(key).ok_or_else(|| {
            IndicatorError::InvalidParameter(format!("Unknown strategy: {}", key))
        })?;
        self.create(key, info.default_config.clone())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
