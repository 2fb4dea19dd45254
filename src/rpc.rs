//! RPC Call Abstraction
//!
//! Defines the call signature shared by the upstream transport and the cache
//! facade, so one can stand in for the other.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RpcCacheError};

// == JSON-RPC Response ==
/// A successful JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, normally "2.0"
    pub jsonrpc: String,
    /// Request identifier
    pub id: u64,
    /// Method result
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a "2.0" response with the given id and result.
    pub fn new(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result,
        }
    }
}

// == RPC Call Trait ==
/// An asynchronous JSON-RPC call function.
#[async_trait]
pub trait RpcCall: Send + Sync {
    /// Invokes `method` with the given positional params.
    async fn call(&self, method: &str, params: &[Value]) -> Result<JsonRpcResponse>;
}

#[async_trait]
impl<T> RpcCall for Arc<T>
where
    T: RpcCall + ?Sized,
{
    async fn call(&self, method: &str, params: &[Value]) -> Result<JsonRpcResponse> {
        (**self).call(method, params).await
    }
}

// == Panic Guard ==
/// Calls `rpc`, turning a panic raised while building or polling the call
/// into [`RpcCacheError::Internal`].
pub(crate) async fn call_catching_panics(
    rpc: &dyn RpcCall,
    method: &str,
    params: &[Value],
) -> Result<JsonRpcResponse> {
    AssertUnwindSafe(async { rpc.call(method, params).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(RpcCacheError::from_panic(payload)))
}

// == Closure Adapter ==
/// Wraps an async closure as an [`RpcCall`]. Created by [`rpc_fn`].
#[derive(Clone)]
pub struct RpcFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for RpcFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcFn").finish_non_exhaustive()
    }
}

/// Turns `Fn(method, params) -> Future` into an [`RpcCall`].
///
/// # Example
/// ```
/// use eth_rpc_cache::{rpc_fn, JsonRpcResponse, RpcCall};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let rpc = rpc_fn(|_method, _params| async move {
///     Ok(JsonRpcResponse::new(1, json!("0x1")))
/// });
///
/// let response = rpc.call("eth_chainId", &[]).await.unwrap();
/// assert_eq!(response.result, json!("0x1"));
/// # });
/// ```
pub fn rpc_fn<F, Fut>(f: F) -> RpcFn<F>
where
    F: Fn(String, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<JsonRpcResponse>> + Send,
{
    RpcFn { f }
}

#[async_trait]
impl<F, Fut> RpcCall for RpcFn<F>
where
    F: Fn(String, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<JsonRpcResponse>> + Send,
{
    async fn call(&self, method: &str, params: &[Value]) -> Result<JsonRpcResponse> {
        (self.f)(method.to_string(), params.to_vec()).await
    }
}
