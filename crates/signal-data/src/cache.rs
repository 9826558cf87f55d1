//! Symbol catalog caching.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

/// In-memory cache of symbol catalogs keyed by exchange id.
#[derive(Debug, Clone, Default)]
pub struct SymbolCache {
    catalogs: Arc<Mutex<HashMap<String, Arc<BTreeSet<String>>>>>,
}

impl SymbolCache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached catalog of an exchange.
    pub fn get(&self, exchange: &str) -> Option<Arc<BTreeSet<String>>> {
        self.catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(exchange)
            .cloned()
    }

    /// Store a catalog, returning the shared copy.
    pub fn put(&self, exchange: &str, symbols: BTreeSet<String>) -> Arc<BTreeSet<String>> {
        let symbols = Arc::new(symbols);
        self.catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(exchange.to_string(), symbols.clone());
        symbols
    }

    /// Forget the catalog of one exchange.
    pub fn clear(&self, exchange: &str) {
        self.catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(exchange);
    }

    /// Forget all catalogs.
    pub fn clear_all(&self) {
        self.catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
