//! Eth RPC Cache - A transparent caching layer for Ethereum JSON-RPC calls
//!
//! Routes each call through a per-method strategy: cached forever, cached for
//! half a block, or passed straight to the node.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod rpc;
pub mod rpc_cache;
pub mod strategy;
pub mod transport;

pub use api::AppState;
pub use cache::{cache_key, CacheStats, CacheStore};
pub use config::{CacheOptions, Config};
pub use error::{Result, RpcCacheError};
pub use rpc::{rpc_fn, JsonRpcResponse, RpcCall};
pub use rpc_cache::EthRpcCache;
pub use strategy::{Strategy, StrategyOptions, Ttl};
pub use transport::HttpRpc;
