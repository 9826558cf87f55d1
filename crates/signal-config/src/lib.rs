//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, ExchangeSettings, LoggingConfig, SessionSettings};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use signal_core::traits::Strategy;
use std::path::Path;

/// Environment variable prefix, e.g. `SIGNALS__SESSION__WINDOW=200`.
pub const ENV_PREFIX: &str = "SIGNALS";

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from an optional file and the environment.
///
/// Without a file the built-in defaults apply, still overridable from the
/// environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    finish(builder)
}

/// Parse configuration from TOML text, with environment overrides.
pub fn parse_config(toml: &str) -> Result<AppConfig, ConfigError> {
    finish(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

/// The defaults rendered as TOML.
pub fn default_config_toml() -> Result<String, toml::ser::Error> {
    AppConfig::default().to_toml()
}

impl AppConfig {
    /// Render as TOML, in the layout `load_config` reads back.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Message(msg.to_string()));

        if self.session.history_limit == 0 {
            return invalid("session.history_limit must be at least 1");
        }
        if self.session.window == 0 {
            return invalid("session.window must be at least 1");
        }
        if self.exchanges.channel_buffer == 0 {
            return invalid("exchanges.channel_buffer must be at least 1");
        }
        if self.exchanges.request_timeout_secs == 0 {
            return invalid("exchanges.request_timeout_secs must be at least 1");
        }
        if self.exchanges.ping_interval_secs == 0 {
            return invalid("exchanges.ping_interval_secs must be at least 1");
        }
        if let Some(strategy) = &self.strategy {
            strategy
                .validate()
                .map_err(|e| ConfigError::Message(format!("strategy: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_core::types::Timeframe;
    use signal_strategies::{MacdConfig, StrategyParams};

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.history_limit, 500);
        assert_eq!(config.session.window, 100);
        assert_eq!(config.session.stream_iterations, 10);
        assert_eq!(config.exchanges.connector_settings().channel_buffer, 64);
    }

    #[test]
    fn test_default_toml_parses_back() {
        let text = default_config_toml().unwrap();
        let config = parse_config(&text).unwrap();

        assert_eq!(config.exchanges.default_exchange, "binance");
        assert_eq!(config.session.default_timeframe, Timeframe::Minute1);
        assert!(config.strategy.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
            [session]
            default_symbol = "ETH/USDT"
            default_timeframe = "1h"
            history_limit = 200
            window = 50
            idle_timeout_ms = 250
            stream_iterations = 3

            [strategy]
            strategy = "macd"
            fast_period = 8
            slow_period = 21
            signal_period = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.session.default_timeframe, Timeframe::Hour1);
        assert_eq!(config.session.idle_timeout().as_millis(), 250);
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.strategy,
            Some(StrategyParams::Macd(MacdConfig {
                fast_period: 8,
                slow_period: 21,
                signal_period: 5
            }))
        );
    }

    #[test]
    fn test_strategy_override_renders_to_toml() {
        let mut config = AppConfig::default();
        config.strategy = Some(StrategyParams::Macd(MacdConfig::default()));

        let text = config.to_toml().unwrap();
        assert!(text.contains("[strategy]"));
        assert!(text.contains("strategy = \"macd\""));

        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed.strategy, config.strategy);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let mut config = AppConfig::default();
        config.session.window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_strategy_is_rejected() {
        let result = parse_config(
            r#"
            [strategy]
            strategy = "rsi"
            period = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Message(_))));
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.app.name, "signal-desk");
        assert_eq!(config.session.default_symbol, "BTC/USDT");
        assert_eq!(config.exchanges.ping_interval_secs, 20);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/signal-desk.toml"))).is_err());
    }
}
