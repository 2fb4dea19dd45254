//! Configuration Module
//!
//! Cache options for library users, and the proxy server configuration loaded
//! from environment variables.

use std::collections::HashMap;
use std::env;

use crate::cache::CacheStore;
use crate::strategy::{Strategy, StrategyOptions, Ttl, PER_BLOCK};

// == Cache Options ==
/// Options accepted when building an [`EthRpcCache`](crate::EthRpcCache).
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Pass unclaimed methods straight to the underlying RPC (default: true)
    pub allow_others: bool,
    /// Externally supplied storage; a fresh store is used when None
    pub cache: Option<CacheStore>,
    /// Strategies in registration order; the built-ins when None
    pub strategies: Option<Vec<Strategy>>,
    /// Settings forwarded to strategies by name
    pub strategy_options: HashMap<String, StrategyOptions>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            allow_others: true,
            cache: None,
            strategies: None,
            strategy_options: HashMap::new(),
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_others(mut self, allow: bool) -> Self {
        self.allow_others = allow;
        self
    }

    /// Uses `store` as backing storage, so it can be shared with other caches.
    pub fn with_cache(mut self, store: CacheStore) -> Self {
        self.cache = Some(store);
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    /// Forwards `options` to the strategy called `name`.
    pub fn with_strategy_options(mut self, name: impl Into<String>, options: StrategyOptions) -> Self {
        self.strategy_options.insert(name.into(), options);
        self
    }

    /// Derives cache options from the server configuration.
    pub fn from_config(config: &Config) -> Self {
        let options = Self::new().allow_others(config.allow_others);
        match config.per_block_ttl_ms {
            Some(ms) => options.with_strategy_options(
                PER_BLOCK,
                StrategyOptions {
                    ttl: Some(Ttl::millis(ms)),
                },
            ),
            None => options,
        }
    }
}

// == Server Config ==
/// Proxy server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of the upstream node
    pub upstream_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Forward methods no strategy claims
    pub allow_others: bool,
    /// Overrides the per-block TTL in milliseconds
    pub per_block_ttl_ms: Option<u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `UPSTREAM_URL` - Upstream node URL (default: http://127.0.0.1:8545)
    /// - `SERVER_PORT` - HTTP server port (default: 8546)
    /// - `ALLOW_OTHERS` - Forward unclaimed methods (default: true)
    /// - `PER_BLOCK_TTL_MS` - Per-block TTL override (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            allow_others: env::var("ALLOW_OTHERS")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.allow_others),
            per_block_ttl_ms: env::var("PER_BLOCK_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_url: "http://127.0.0.1:8545".to_string(),
            server_port: 8546,
            allow_others: true,
            per_block_ttl_ms: None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
