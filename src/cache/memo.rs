//! Memoizing Cache Module
//!
//! One `MemoCache` exists per cached policy. It memoizes the underlying RPC
//! call by cache key, honours the policy TTL and coalesces concurrent callers
//! of the same key onto a single in-flight request.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::store::{Lookup, PendingCall};
use crate::cache::{cache_key, CacheStats, CacheStore};
use crate::error::Result;
use crate::rpc::{call_catching_panics, JsonRpcResponse, RpcCall};
use crate::strategy::Ttl;

// == Memo Cache ==
/// A policy-bound memoizer over the underlying RPC function.
#[derive(Clone)]
pub struct MemoCache {
    /// Policy this cache belongs to
    policy: String,
    /// Lifetime of settled entries
    ttl: Ttl,
    /// The wrapped RPC function
    rpc: Arc<dyn RpcCall>,
    /// Backing storage, possibly shared with other caches
    store: CacheStore,
}

impl fmt::Debug for MemoCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("policy", &self.policy)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl MemoCache {
    // == Constructor ==
    pub fn new(policy: impl Into<String>, ttl: Ttl, rpc: Arc<dyn RpcCall>, store: CacheStore) -> Self {
        Self {
            policy: policy.into(),
            ttl,
            rpc,
            store,
        }
    }

    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    // == Call ==
    /// Returns the memoized response for `(method, params)`.
    ///
    /// A settled, unexpired entry is returned directly. An in-flight request
    /// for the same key is joined. Otherwise a new underlying call is started
    /// and registered so later callers can join it. Failures reach every
    /// waiter and are never stored.
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Arc<JsonRpcResponse>> {
        let key = cache_key(method, params);

        let pending = {
            let mut inner = self.store.lock().await;
            match inner.lookup(&key, Instant::now()) {
                Lookup::Hit(value) => {
                    inner.stats_mut(&self.policy).record_hit();
                    debug!(policy = %self.policy, "Cache hit: {}", key);
                    return Ok(value);
                }
                Lookup::InFlight(call) => {
                    inner.stats_mut(&self.policy).record_coalesced();
                    debug!(policy = %self.policy, "Joining in-flight call: {}", key);
                    call
                }
                lookup => {
                    if matches!(lookup, Lookup::Expired) {
                        inner.stats_mut(&self.policy).record_expired();
                        debug!(policy = %self.policy, "Cache entry expired: {}", key);
                    }
                    inner.stats_mut(&self.policy).record_miss();
                    debug!(policy = %self.policy, "Cache miss: {}", key);

                    let generation = inner.next_generation();
                    let call = self.start(key.clone(), generation, method, params);
                    inner.begin(key, generation, call.clone());
                    call
                }
            }
        };

        pending.await
    }

    /// Builds the shared future for a fresh underlying call.
    ///
    /// The future settles its own slot once the call completes, whichever
    /// waiter happens to drive it. A panicking call settles as a failure.
    fn start(&self, key: String, generation: u64, method: &str, params: &[Value]) -> PendingCall {
        let rpc = Arc::clone(&self.rpc);
        let store = self.store.clone();
        let ttl = self.ttl;
        let method = method.to_string();
        let params = params.to_vec();

        async move {
            let outcome = call_catching_panics(rpc.as_ref(), &method, &params)
                .await
                .map(Arc::new);
            store.settle(&key, generation, ttl, &outcome).await;
            outcome
        }
        .boxed()
        .shared()
    }

    // == Stats ==
    /// Returns this policy's statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.policy_stats(&self.policy).await
    }
}
