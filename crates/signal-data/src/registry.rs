//! Exchange registry for selecting connectors by id.

use signal_core::error::DataError;
use signal_core::traits::ExchangeConnector;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::{BinanceConnector, BybitConnector, KrakenConnector};

/// Network settings shared by all connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorSettings {
    /// Timeout for each REST request
    pub request_timeout: Duration,
    /// Bars buffered between a live feed and its consumer
    pub channel_buffer: usize,
    /// Interval of application-level keep-alive messages
    pub ping_interval: Duration,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            channel_buffer: 64,
            ping_interval: Duration::from_secs(20),
        }
    }
}

/// Connectors keyed by exchange id.
#[derive(Clone, Default)]
pub struct ExchangeRegistry {
    connectors: BTreeMap<String, Arc<dyn ExchangeConnector>>,
}

impl ExchangeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in exchange.
    pub fn with_defaults(settings: ConnectorSettings) -> Result<Self, DataError> {
        let mut registry = Self::new();
        registry.register(Arc::new(BinanceConnector::global(settings)?));
        registry.register(Arc::new(BinanceConnector::us(settings)?));
        registry.register(Arc::new(BybitConnector::new(settings)?));
        registry.register(Arc::new(KrakenConnector::new(settings)?));
        Ok(registry)
    }

    /// Add a connector, replacing any with the same id.
    pub fn register(&mut self, connector: Arc<dyn ExchangeConnector>) {
        self.connectors.insert(connector.id().to_string(), connector);
    }

    /// Look up a connector.
    pub fn get(&self, id: &str) -> Result<Arc<dyn ExchangeConnector>, DataError> {
        self.connectors
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::UnknownExchange(id.to_string()))
    }

    /// Sorted exchange ids.
    pub fn ids(&self) -> Vec<String> {
        self.connectors.keys().cloned().collect()
    }
}

impl std::fmt::Debug for ExchangeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRegistry")
            .field("exchanges", &self.ids())
            .finish()
    }
}
