//! Book manager configuration.

use serde::{Deserialize, Serialize};

const DEFAULT_EVENT_VERSION: u32 = 1;
const DEFAULT_ARENA_CAPACITY: usize = 1024;

/// Settings applied when a [`BookManager`](crate::orderbook::BookManager) is built.
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```
/// use matchbook::orderbook::BookConfig;
///
/// let config: BookConfig = serde_json::from_str(r#"{"uppercase_symbols": true}"#).unwrap();
/// assert_eq!(config.event_version, 1);
/// assert!(config.uppercase_symbols);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Schema version stamped on every emitted event
    pub event_version: u32,
    /// Number of orders the arena reserves room for up front
    pub arena_capacity: usize,
    /// Upper-case symbols of incoming orders, amendments and depth queries
    pub uppercase_symbols: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            event_version: DEFAULT_EVENT_VERSION,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            uppercase_symbols: false,
        }
    }
}

impl BookConfig {
    /// Set the event schema version.
    #[must_use = "builders do nothing unless consumed"]
    pub fn with_event_version(mut self, event_version: u32) -> Self {
        self.event_version = event_version;
        self
    }

    /// Set the initial arena capacity.
    #[must_use = "builders do nothing unless consumed"]
    pub fn with_arena_capacity(mut self, arena_capacity: usize) -> Self {
        self.arena_capacity = arena_capacity;
        self
    }

    /// Enable or disable symbol upper-casing.
    #[must_use = "builders do nothing unless consumed"]
    pub fn with_uppercase_symbols(mut self, uppercase_symbols: bool) -> Self {
        self.uppercase_symbols = uppercase_symbols;
        self
    }

    /// Applies the symbol policy to `symbol`.
    pub fn normalize_symbol(&self, symbol: &str) -> String {
        if self.uppercase_symbols {
            symbol.to_uppercase()
        } else {
            symbol.to_string()
        }
    }
}
