//! Configuration for the bazaar search layer
//!
//! Configuration is layered: hardcoded defaults, then an optional TOML
//! file, then environment variables with the `BAZAAR_` prefix and `__`
//! as the nesting separator (e.g. `BAZAAR_SEARCH__HOST`).

use crate::error::{Error, Result};
use config::{Config as ConfigLib, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the bazaar search layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search engine configuration
    #[serde(default)]
    pub search: SearchConfig,
}

/// Configuration for the Typesense search backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search engine host (no scheme, e.g. "search.bazaar.dev")
    #[serde(default = "default_host")]
    pub host: String,

    /// Read-only search API key
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Main product catalog collection
    #[serde(default = "default_products_collection")]
    pub products_collection: String,

    /// Shop-scoped product collection
    #[serde(default = "default_shop_products_collection")]
    pub shop_products_collection: String,

    /// Orders collection
    #[serde(default = "default_orders_collection")]
    pub orders_collection: String,

    /// Shop directory collection
    #[serde(default = "default_shops_collection")]
    pub shops_collection: String,

    /// Maximum attempts per request (including the first)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Base backoff delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Timeout in milliseconds for most search requests
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout in milliseconds for category suggestion requests
    #[serde(default = "default_category_timeout_ms")]
    pub category_timeout_ms: u64,

    /// Timeout in milliseconds for order search requests
    #[serde(default = "default_order_timeout_ms")]
    pub order_timeout_ms: u64,

    /// Debounce window in milliseconds for typeahead queries
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_key: default_api_key(),
            products_collection: default_products_collection(),
            shop_products_collection: default_shop_products_collection(),
            orders_collection: default_orders_collection(),
            shops_collection: default_shops_collection(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            timeout_ms: default_timeout_ms(),
            category_timeout_ms: default_category_timeout_ms(),
            order_timeout_ms: default_order_timeout_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

// Development fallbacks. The key is a read-only search-scoped key;
// production deployments must override both via file or environment.
fn default_host() -> String {
    "search.bazaar.dev".to_string()
}

fn default_api_key() -> String {
    "bazaar-dev-readonly-key".to_string()
}

fn default_products_collection() -> String {
    "products".to_string()
}

fn default_shop_products_collection() -> String {
    "shop_products".to_string()
}

fn default_orders_collection() -> String {
    "orders".to_string()
}

fn default_shops_collection() -> String {
    "shops".to_string()
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_category_timeout_ms() -> u64 {
    3_000
}

fn default_order_timeout_ms() -> u64 {
    10_000
}

fn default_debounce_ms() -> u64 {
    300
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `BAZAAR_` and use double underscores
    /// for nested values. For example:
    /// - `BAZAAR_SEARCH__HOST=search.example.com`
    /// - `BAZAAR_SEARCH__API_KEY=...`
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("BAZAAR")
                .separator("__")
                .try_parsing(true),
        );

        // Support the bare environment variables the deployment tooling sets
        if let Ok(host) = std::env::var("TYPESENSE_HOST") {
            builder = builder
                .set_override("search.host", host)
                .map_err(|e| Error::config(format!("Failed to set TYPESENSE_HOST: {e}")))?;
        }
        if let Ok(key) = std::env::var("TYPESENSE_SEARCH_KEY") {
            builder = builder
                .set_override("search.api_key", key)
                .map_err(|e| Error::config(format!("Failed to set TYPESENSE_SEARCH_KEY: {e}")))?;
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }
}
