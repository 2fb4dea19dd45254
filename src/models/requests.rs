//! Request DTOs for the proxy API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// A single JSON-RPC request (POST /)
///
/// # Fields
/// - `jsonrpc`: Protocol version, echoed back in the reply
/// - `id`: Client chosen identifier, echoed back in the reply
/// - `method`: Method to invoke
/// - `params`: Positional params, empty when omitted
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

fn default_version() -> String {
    "2.0".to_string()
}
