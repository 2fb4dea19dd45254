//! HTTP Transport
//!
//! Sends JSON-RPC requests to an upstream node over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Result, RpcCacheError};
use crate::rpc::{JsonRpcResponse, RpcCall};

/// Error object of a failed JSON-RPC response.
#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Either half of a JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

// == HTTP RPC ==
/// JSON-RPC client for an upstream node.
#[derive(Debug)]
pub struct HttpRpc {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpc {
    /// Creates a client for the node at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RpcCall for HttpRpc {
    async fn call(&self, method: &str, params: &[Value]) -> Result<JsonRpcResponse> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(id, "Upstream request: {}", method);
        let envelope: Envelope = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = envelope.error {
            warn!(code = error.code, "Upstream error for {}: {}", method, error.message);
            return Err(RpcCacheError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(JsonRpcResponse {
            jsonrpc: envelope.jsonrpc.unwrap_or_else(|| "2.0".to_string()),
            id: envelope.id.as_u64().unwrap_or(id),
            result: envelope.result.unwrap_or(Value::Null),
        })
    }
}
