//! RPC Cache Facade
//!
//! Wraps an underlying RPC function and routes each call through the caching
//! policy its method resolves to.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheOptions;
use crate::error::{Result, RpcCacheError};
use crate::registry::StrategyRegistry;
use crate::rpc::{call_catching_panics, JsonRpcResponse, RpcCall};
use crate::strategy::default_strategies;

// == Eth RPC Cache ==
/// A caching drop-in replacement for an RPC call function.
///
/// Results served from a cache are always handed out as fresh copies, so
/// callers can never mutate what is stored.
#[derive(Clone)]
pub struct EthRpcCache {
    rpc: Arc<dyn RpcCall>,
    registry: StrategyRegistry,
    store: CacheStore,
    allow_others: bool,
}

impl fmt::Debug for EthRpcCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthRpcCache")
            .field("registry", &self.registry)
            .field("allow_others", &self.allow_others)
            .finish_non_exhaustive()
    }
}

impl EthRpcCache {
    // == Constructors ==
    /// Wraps `rpc` with the built-in strategies and default options.
    pub fn new<R>(rpc: R) -> Self
    where
        R: RpcCall + 'static,
    {
        Self::with_options(rpc, CacheOptions::default())
    }

    /// Wraps `rpc` using the given options.
    pub fn with_options<R>(rpc: R, options: CacheOptions) -> Self
    where
        R: RpcCall + 'static,
    {
        info!("Creating EVM RPC cache");

        let rpc: Arc<dyn RpcCall> = Arc::new(rpc);
        let store = options.cache.unwrap_or_default();
        let strategies = options.strategies.unwrap_or_else(default_strategies);
        let registry = StrategyRegistry::build(
            &strategies,
            Arc::clone(&rpc),
            &store,
            &options.strategy_options,
        );

        Self {
            rpc,
            registry,
            store,
            allow_others: options.allow_others,
        }
    }

    // == Call ==
    /// Performs a JSON-RPC call, from cache when the method's policy allows.
    ///
    /// 1. Resolve the policy for `method` and `params`.
    /// 2. A policy with a cache answers from it, cloning the shared result.
    /// 3. A registered policy without a cache is forwarded directly; a policy
    ///    name no strategy registered is an internal error.
    /// 4. Unclaimed methods are forwarded when `allow_others` is set, and
    ///    rejected with [`RpcCacheError::MethodNotFound`] otherwise.
    ///
    /// Resolver failures and panics in the underlying call surface as
    /// [`RpcCacheError::Internal`].
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<JsonRpcResponse> {
        let policy = self.resolve(method, params).inspect_err(|err| {
            warn!("Failed to resolve strategy for {}: {}", method, err);
        })?;

        match policy {
            Some(policy) => match self.registry.cache(&policy) {
                Some(cache) => {
                    let shared = cache.call(method, params).await?;
                    Ok(clone_result(&shared))
                }
                None if self.registry.has_strategy(&policy) => {
                    debug!("Strategy \"{}\" does not cache, forwarding {}", policy, method);
                    call_catching_panics(self.rpc.as_ref(), method, params).await
                }
                None => {
                    warn!("Method {} resolved to unknown strategy \"{}\"", method, policy);
                    Err(RpcCacheError::internal(format!(
                        "Unknown strategy \"{policy}\""
                    )))
                }
            },
            None if self.allow_others => {
                debug!("Method {} not configured, forwarding", method);
                call_catching_panics(self.rpc.as_ref(), method, params).await
            }
            None => {
                debug!("Method {} not configured, rejecting", method);
                Err(RpcCacheError::MethodNotFound)
            }
        }
    }

    /// Runs the resolver claimed for `method`, if any.
    fn resolve(&self, method: &str, params: &[Value]) -> Result<Option<String>> {
        let Some(resolver) = self.registry.resolver_for(method) else {
            return Ok(None);
        };

        match panic::catch_unwind(AssertUnwindSafe(|| resolver(method, params))) {
            Ok(Ok(policy)) => Ok(policy),
            Ok(Err(err)) => Err(RpcCacheError::internal(err.to_string())),
            Err(payload) => Err(RpcCacheError::from_panic(payload)),
        }
    }

    // == Introspection ==
    /// Returns the backing store.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Returns the registry built from the configured strategies.
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn allows_others(&self) -> bool {
        self.allow_others
    }

    /// Returns per-policy statistics.
    pub async fn stats(&self) -> BTreeMap<String, CacheStats> {
        self.store.stats().await
    }
}

#[async_trait]
impl RpcCall for EthRpcCache {
    async fn call(&self, method: &str, params: &[Value]) -> Result<JsonRpcResponse> {
        EthRpcCache::call(self, method, params).await
    }
}

// == Result Cloner ==
/// Deep-copies a shared cached response for a single caller.
///
/// `serde_json::Value` owns all of its children, so the copy shares no
/// mutable state with the stored response.
fn clone_result(shared: &Arc<JsonRpcResponse>) -> JsonRpcResponse {
    JsonRpcResponse::clone(shared)
}
