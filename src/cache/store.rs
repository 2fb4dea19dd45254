//! Cache Store Module
//!
//! Raw keyed storage shared by every policy cache of a facade. A store can be
//! handed to several facades so they share one backing map.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};
use crate::error::Result;
use crate::rpc::JsonRpcResponse;
use crate::strategy::Ttl;

/// An underlying call that any number of callers can await.
pub(crate) type PendingCall = Shared<BoxFuture<'static, Result<Arc<JsonRpcResponse>>>>;

// == Slot ==
/// State of a single key.
pub(crate) enum Slot {
    /// A settled response
    Ready(CacheEntry),
    /// An underlying call in flight; `generation` identifies who may settle it
    Pending { generation: u64, call: PendingCall },
}

/// Outcome of looking a key up.
pub(crate) enum Lookup {
    Hit(Arc<JsonRpcResponse>),
    InFlight(PendingCall),
    Expired,
    Missing,
}

// == Store Internals ==
#[derive(Default)]
pub(crate) struct StoreInner {
    slots: HashMap<String, Slot>,
    stats: HashMap<String, CacheStats>,
    next_generation: u64,
}

impl StoreInner {
    /// Classifies the slot for `key` at `now`.
    ///
    /// Stale entries are reported, not removed; the caller replaces them.
    pub(crate) fn lookup(&self, key: &str, now: Instant) -> Lookup {
        match self.slots.get(key) {
            Some(Slot::Ready(entry)) if entry.is_expired_at(now) => Lookup::Expired,
            Some(Slot::Ready(entry)) => Lookup::Hit(Arc::clone(&entry.value)),
            Some(Slot::Pending { call, .. }) => Lookup::InFlight(call.clone()),
            None => Lookup::Missing,
        }
    }

    /// Reserves a generation for a new in-flight call.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Marks `key` as in flight, replacing whatever was stored.
    pub(crate) fn begin(&mut self, key: String, generation: u64, call: PendingCall) {
        self.slots.insert(key, Slot::Pending { generation, call });
    }

    pub(crate) fn stats_mut(&mut self, policy: &str) -> &mut CacheStats {
        self.stats.entry(policy.to_string()).or_default()
    }
}

// == Cache Store ==
/// Shared, internally synchronized storage for cached responses.
///
/// Cloning a `CacheStore` yields another handle to the same storage.
#[derive(Clone, Default)]
pub struct CacheStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().await
    }

    // == Settle ==
    /// Records the outcome of the in-flight call identified by `generation`.
    ///
    /// Success turns the slot into a settled entry; failure clears it so the
    /// next caller retries. A slot taken over by a newer call is left alone.
    pub(crate) async fn settle(
        &self,
        key: &str,
        generation: u64,
        ttl: Ttl,
        outcome: &Result<Arc<JsonRpcResponse>>,
    ) {
        let mut inner = self.inner.lock().await;

        let owned = matches!(
            inner.slots.get(key),
            Some(Slot::Pending { generation: current, .. }) if *current == generation
        );
        if !owned {
            debug!("Discarding superseded result for {}", key);
            return;
        }

        match outcome {
            Ok(value) => {
                let entry = CacheEntry::new(Arc::clone(value), ttl);
                inner.slots.insert(key.to_string(), Slot::Ready(entry));
            }
            Err(err) => {
                debug!("Not caching failed call {}: {}", key, err);
                inner.slots.remove(key);
            }
        }
    }

    // == Get ==
    /// Returns a copy of the settled, unexpired response stored under `key`.
    pub async fn get(&self, key: &str) -> Option<JsonRpcResponse> {
        let inner = self.inner.lock().await;
        match inner.lookup(key, Instant::now()) {
            Lookup::Hit(value) => Some(JsonRpcResponse::clone(&value)),
            _ => None,
        }
    }

    // == Length ==
    /// Returns the number of settled entries, expired ones included until
    /// they are looked up or purged.
    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    // == Is Empty ==
    /// Returns true if no entry is settled.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // == In Flight ==
    /// Returns the number of underlying calls currently pending.
    pub async fn in_flight(&self) -> usize {
        let inner = self.inner.lock().await;
        inner
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Pending { .. }))
            .count()
    }

    // == Purge Expired ==
    /// Removes all expired settled entries. Returns the number removed.
    ///
    /// Expiry is otherwise handled lazily on lookup; this is for callers who
    /// want to reclaim memory explicitly.
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let before = inner.slots.len();
        inner.slots.retain(|_, slot| match slot {
            Slot::Ready(entry) => !entry.is_expired_at(now),
            Slot::Pending { .. } => true,
        });
        before - inner.slots.len()
    }

    // == Clear ==
    /// Drops every settled entry. In-flight calls are kept so their waiters
    /// still settle normally.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner
            .slots
            .retain(|_, slot| matches!(slot, Slot::Pending { .. }));
    }

    // == Stats ==
    /// Returns statistics for every policy that has served a call.
    pub async fn stats(&self) -> BTreeMap<String, CacheStats> {
        let inner = self.inner.lock().await;
        inner
            .stats
            .iter()
            .map(|(name, stats)| (name.clone(), *stats))
            .collect()
    }

    /// Returns statistics for one policy.
    pub async fn policy_stats(&self, policy: &str) -> CacheStats {
        let inner = self.inner.lock().await;
        inner.stats.get(policy).copied().unwrap_or_default()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;
    use std::time::Duration;

    fn pending(value: &str) -> PendingCall {
        let response = Arc::new(JsonRpcResponse::new(1, json!(value)));
        futures::future::ready(Ok(response)).boxed().shared()
    }

    async fn seed(store: &CacheStore, key: &str, ttl: Ttl) -> u64 {
        let generation = {
            let mut inner = store.lock().await;
            let generation = inner.next_generation();
            inner.begin(key.to_string(), generation, pending(key));
            generation
        };
        let outcome = Ok(Arc::new(JsonRpcResponse::new(1, json!(key))));
        store.settle(key, generation, ttl, &outcome).await;
        generation
    }

    #[tokio::test]
    async fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
        assert!(store.stats().await.is_empty());
    }

    #[tokio::test]
    async fn test_settle_success_stores_entry() {
        let store = CacheStore::new();
        seed(&store, "eth_chainId()", Ttl::Infinite).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.in_flight().await, 0);
        let value = store.get("eth_chainId()").await.unwrap();
        assert_eq!(value.result, json!("eth_chainId()"));
    }

    #[tokio::test]
    async fn test_settle_failure_clears_slot() {
        let store = CacheStore::new();
        let generation = {
            let mut inner = store.lock().await;
            let generation = inner.next_generation();
            inner.begin("k".to_string(), generation, pending("k"));
            generation
        };
        assert_eq!(store.in_flight().await, 1);

        let outcome = Err(crate::error::RpcCacheError::Transport("boom".to_string()));
        store.settle("k", generation, Ttl::Infinite, &outcome).await;

        assert_eq!(store.in_flight().await, 0);
        assert!(store.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_settle_ignores_superseded_generation() {
        let store = CacheStore::new();
        let (old, new) = {
            let mut inner = store.lock().await;
            let old = inner.next_generation();
            inner.begin("k".to_string(), old, pending("old"));
            let new = inner.next_generation();
            inner.begin("k".to_string(), new, pending("new"));
            (old, new)
        };
        assert_ne!(old, new);

        let stale = Ok(Arc::new(JsonRpcResponse::new(1, json!("old"))));
        store.settle("k", old, Ttl::Infinite, &stale).await;
        assert!(store.get("k").await.is_none());
        assert_eq!(store.in_flight().await, 1);

        let fresh = Ok(Arc::new(JsonRpcResponse::new(1, json!("new"))));
        store.settle("k", new, Ttl::Infinite, &fresh).await;
        assert_eq!(store.get("k").await.unwrap().result, json!("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_reports_expired() {
        let store = CacheStore::new();
        seed(&store, "k", Ttl::Finite(Duration::from_secs(6))).await;

        tokio::time::advance(Duration::from_secs(7)).await;
        let inner = store.lock().await;
        assert!(matches!(inner.lookup("k", Instant::now()), Lookup::Expired));
        assert!(matches!(inner.lookup("other", Instant::now()), Lookup::Missing));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = CacheStore::new();
        seed(&store, "short", Ttl::Finite(Duration::from_secs(1))).await;
        seed(&store, "long", Ttl::Finite(Duration::from_secs(60))).await;
        seed(&store, "forever", Ttl::Infinite).await;

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 2);
        assert!(store.get("long").await.is_some());
        assert!(store.get("forever").await.is_some());
    }

    #[tokio::test]
    async fn test_clear_keeps_in_flight() {
        let store = CacheStore::new();
        seed(&store, "settled", Ttl::Infinite).await;
        {
            let mut inner = store.lock().await;
            let generation = inner.next_generation();
            inner.begin("pending".to_string(), generation, pending("pending"));
        }

        store.clear().await;

        assert!(store.is_empty().await);
        assert_eq!(store.in_flight().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let store = CacheStore::new();
        let other = store.clone();
        seed(&store, "k", Ttl::Infinite).await;

        assert!(other.get("k").await.is_some());
    }

    #[tokio::test]
    async fn test_policy_stats() {
        let store = CacheStore::new();
        {
            let mut inner = store.lock().await;
            inner.stats_mut("permanent").record_hit();
            inner.stats_mut("permanent").record_miss();
        }

        let stats = store.policy_stats("permanent").await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(store.policy_stats("perBlock").await, CacheStats::default());
        assert_eq!(store.stats().await.len(), 1);
    }
}
