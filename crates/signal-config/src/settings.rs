//! Configuration structures.

use serde::{Deserialize, Serialize};
use signal_core::types::Timeframe;
use signal_data::ConnectorSettings;
use signal_strategies::StrategyParams;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchanges: ExchangeSettings,
    #[serde(default)]
    pub session: SessionSettings,
    /// Strategy used instead of the timeframe default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyParams>,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "signal-desk".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` takes precedence
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Directory for daily rolling log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Exchange connectivity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSettings {
    /// Exchange used when none is given
    pub default_exchange: String,
    pub request_timeout_secs: u64,
    /// Live bars buffered per subscription
    pub channel_buffer: usize,
    pub ping_interval_secs: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            default_exchange: "binance".to_string(),
            request_timeout_secs: 10,
            channel_buffer: 64,
            ping_interval_secs: 20,
        }
    }
}

impl ExchangeSettings {
    pub fn connector_settings(&self) -> ConnectorSettings {
        ConnectorSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            channel_buffer: self.channel_buffer,
            ping_interval: Duration::from_secs(self.ping_interval_secs),
        }
    }
}

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub default_symbol: String,
    pub default_timeframe: Timeframe,
    /// Bars fetched on load
    pub history_limit: usize,
    /// Bars retained while streaming
    pub window: usize,
    /// How long one streaming tick waits for a bar
    pub idle_timeout_ms: u64,
    /// Ticks per streaming run
    pub stream_iterations: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_symbol: "BTC/USDT".to_string(),
            default_timeframe: Timeframe::Minute1,
            history_limit: 500,
            window: 100,
            idle_timeout_ms: 1000,
            stream_iterations: 10,
        }
    }
}

impl SessionSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}
