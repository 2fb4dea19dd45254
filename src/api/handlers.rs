//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::warn;

use crate::config::{CacheOptions, Config};
use crate::models::{HealthResponse, RpcReply, RpcRequest, StatsResponse};
use crate::rpc::RpcCall;
use crate::rpc_cache::EthRpcCache;
use crate::transport::HttpRpc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The caching RPC facade
    pub cache: Arc<EthRpcCache>,
}

impl AppState {
    /// Creates a new AppState around an existing facade.
    pub fn new(cache: EthRpcCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Wraps an arbitrary upstream RPC function with the given options.
    pub fn with_upstream<R>(upstream: R, options: CacheOptions) -> Self
    where
        R: RpcCall + 'static,
    {
        Self::new(EthRpcCache::with_options(upstream, options))
    }

    /// Creates a new AppState from configuration.
    ///
    /// Points an HTTP transport at the configured upstream node.
    pub fn from_config(config: &Config) -> Self {
        Self::with_upstream(
            HttpRpc::new(config.upstream_url.clone()),
            CacheOptions::from_config(config),
        )
    }
}

/// Handler for POST /
///
/// Runs a JSON-RPC request through the cache. The reply always carries the
/// client's own `id`, whichever request originally filled the cache.
pub async fn rpc_handler(
    State(state): State<AppState>,
    Json(req): Json<RpcRequest>,
) -> Json<RpcReply> {
    match state.cache.call(&req.method, &req.params).await {
        Ok(response) => Json(RpcReply::success(req.id, req.jsonrpc, response.result)),
        Err(err) => {
            warn!(code = err.code(), "Call to {} failed: {}", req.method, err);
            Json(RpcReply::failure(req.id, &err))
        }
    }
}

/// Handler for GET /stats
///
/// Returns per-policy cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.cache.store();
    let total_entries = store.len().await;
    let in_flight = store.in_flight().await;
    let policies = state.cache.stats().await;

    Json(StatsResponse::new(total_entries, in_flight, policies))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
