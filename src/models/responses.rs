//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::error::RpcCacheError;

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

impl From<&RpcCacheError> for ErrorObject {
    fn from(err: &RpcCacheError) -> Self {
        let message = match err {
            RpcCacheError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            code: err.code(),
            message,
        }
    }
}

/// Reply to a JSON-RPC request (POST /)
///
/// Exactly one of `result` and `error` is present.
#[derive(Debug, Clone, Serialize)]
pub struct RpcReply {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl RpcReply {
    /// Creates a successful reply
    pub fn success(id: Value, jsonrpc: impl Into<String>, result: Value) -> Self {
        Self {
            jsonrpc: jsonrpc.into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error reply
    pub fn failure(id: Value, err: &RpcCacheError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(ErrorObject::from(err)),
        }
    }
}

/// Statistics of one policy
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub expired: u64,
    /// Share of calls answered without a new upstream request
    pub hit_rate: f64,
}

impl From<CacheStats> for PolicyStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            coalesced: stats.coalesced,
            expired: stats.expired,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Settled entries in the store
    pub total_entries: usize,
    /// Upstream calls currently pending
    pub in_flight: usize,
    /// Per-policy counters
    pub policies: BTreeMap<String, PolicyStatsResponse>,
}

impl StatsResponse {
    pub fn new(
        total_entries: usize,
        in_flight: usize,
        policies: BTreeMap<String, CacheStats>,
    ) -> Self {
        Self {
            total_entries,
            in_flight,
            policies: policies
                .into_iter()
                .map(|(name, stats)| (name, stats.into()))
                .collect(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
