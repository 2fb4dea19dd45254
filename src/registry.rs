//! Strategy Registry
//!
//! Turns an ordered list of strategies into the two lookups the facade needs:
//! method → resolver, and policy name → memoizing cache.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{CacheStore, MemoCache};
use crate::rpc::RpcCall;
use crate::strategy::{Resolver, Strategy, StrategyOptions};

// == Strategy Registry ==
/// Method and policy lookups built once from a strategy list.
///
/// When several strategies claim the same method, the one registered last
/// wins. Among same-named strategies the last one with a TTL owns the cache;
/// a same-named strategy without TTL leaves that cache in place.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    resolvers: HashMap<String, Resolver>,
    caches: HashMap<String, MemoCache>,
    names: HashSet<String>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.resolvers.keys().collect();
        methods.sort();
        let mut policies: Vec<&String> = self.caches.keys().collect();
        policies.sort();

        f.debug_struct("StrategyRegistry")
            .field("methods", &methods)
            .field("policies", &policies)
            .finish()
    }
}

impl StrategyRegistry {
    // == Build ==
    /// Builds the registry.
    ///
    /// # Arguments
    /// * `strategies` - Strategies in registration order
    /// * `rpc` - Underlying RPC function wrapped by every cache
    /// * `store` - Backing storage shared by every cache
    /// * `options` - Per-strategy settings, looked up by strategy name
    pub fn build(
        strategies: &[Strategy],
        rpc: Arc<dyn RpcCall>,
        store: &CacheStore,
        options: &HashMap<String, StrategyOptions>,
    ) -> Self {
        let mut resolvers = HashMap::new();
        let mut caches = HashMap::new();
        let mut names = HashSet::new();

        for strategy in strategies {
            info!("Using strategy \"{}\"", strategy.name);
            names.insert(strategy.name.clone());

            let resolver = strategy.effective_resolver();
            for method in &strategy.methods {
                if resolvers
                    .insert(method.clone(), Arc::clone(&resolver))
                    .is_some()
                {
                    debug!(
                        "Method {} reassigned to strategy \"{}\"",
                        method, strategy.name
                    );
                }
            }

            let ttl = options
                .get(&strategy.name)
                .and_then(|opts| opts.ttl)
                .or(strategy.ttl);
            if let Some(ttl) = ttl {
                let cache = MemoCache::new(
                    strategy.name.clone(),
                    ttl,
                    Arc::clone(&rpc),
                    store.clone(),
                );
                caches.insert(strategy.name.clone(), cache);
            }
        }

        Self {
            resolvers,
            caches,
            names,
        }
    }

    // == Lookups ==
    /// Returns the resolver for `method`, or None when no strategy claims it.
    pub fn resolver_for(&self, method: &str) -> Option<&Resolver> {
        self.resolvers.get(method)
    }

    /// Returns the cache bound to `policy`, if that policy caches.
    pub fn cache(&self, policy: &str) -> Option<&MemoCache> {
        self.caches.get(policy)
    }

    /// Whether any strategy was registered under `policy`, cached or not.
    pub fn has_strategy(&self, policy: &str) -> bool {
        self.names.contains(policy)
    }

    /// Names of the policies that cache, sorted.
    pub fn policies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.caches.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{rpc_fn, JsonRpcResponse};
    use crate::strategy::{default_strategies, Ttl, PER_BLOCK, PERMANENT};
    use serde_json::json;

    fn noop_rpc() -> Arc<dyn RpcCall> {
        Arc::new(rpc_fn(|_, _| async move { Ok(JsonRpcResponse::new(1, json!(null))) }))
    }

    fn resolve(registry: &StrategyRegistry, method: &str) -> Option<String> {
        registry
            .resolver_for(method)
            .and_then(|resolver| resolver(method, &[]).unwrap())
    }

    #[test]
    fn test_build_default_strategies() {
        let registry = StrategyRegistry::build(
            &default_strategies(),
            noop_rpc(),
            &CacheStore::new(),
            &HashMap::new(),
        );

        assert_eq!(resolve(&registry, "eth_chainId").as_deref(), Some(PERMANENT));
        assert_eq!(resolve(&registry, "eth_blockNumber").as_deref(), Some(PER_BLOCK));
        assert!(registry.resolver_for("eth_sendRawTransaction").is_none());
        assert_eq!(registry.policies(), vec![PER_BLOCK, PERMANENT]);
        assert_eq!(registry.cache(PERMANENT).unwrap().ttl(), Ttl::Infinite);
    }

    #[test]
    fn test_last_claim_wins() {
        let strategies = vec![
            Strategy::new("first", ["eth_call"]).with_ttl(Ttl::Infinite),
            Strategy::new("second", ["eth_call"]).with_ttl(Ttl::millis(100)),
        ];
        let registry =
            StrategyRegistry::build(&strategies, noop_rpc(), &CacheStore::new(), &HashMap::new());

        assert_eq!(resolve(&registry, "eth_call").as_deref(), Some("second"));
        // Both caches still exist; only the method claim moved
        assert_eq!(registry.policies(), vec!["first", "second"]);
    }

    #[test]
    fn test_strategy_without_ttl_has_no_cache() {
        let strategies = vec![Strategy::new("passthrough", ["eth_sendRawTransaction"])];
        let registry =
            StrategyRegistry::build(&strategies, noop_rpc(), &CacheStore::new(), &HashMap::new());

        assert_eq!(
            resolve(&registry, "eth_sendRawTransaction").as_deref(),
            Some("passthrough")
        );
        assert!(registry.cache("passthrough").is_none());
        assert!(registry.has_strategy("passthrough"));
        assert!(!registry.has_strategy("pasthrough"));
        assert!(registry.policies().is_empty());
    }

    #[test]
    fn test_same_name_without_ttl_keeps_cache() {
        let strategies = vec![
            Strategy::new(PERMANENT, ["eth_chainId"]).with_ttl(Ttl::Infinite),
            Strategy::new(PERMANENT, ["net_version"]),
        ];
        let registry =
            StrategyRegistry::build(&strategies, noop_rpc(), &CacheStore::new(), &HashMap::new());

        assert_eq!(resolve(&registry, "eth_chainId").as_deref(), Some(PERMANENT));
        assert_eq!(resolve(&registry, "net_version").as_deref(), Some(PERMANENT));
        assert_eq!(registry.cache(PERMANENT).unwrap().ttl(), Ttl::Infinite);
    }

    #[test]
    fn test_options_override_ttl() {
        let mut options = HashMap::new();
        options.insert(
            PER_BLOCK.to_string(),
            StrategyOptions {
                ttl: Some(Ttl::millis(1500)),
            },
        );
        let registry =
            StrategyRegistry::build(&default_strategies(), noop_rpc(), &CacheStore::new(), &options);

        assert_eq!(registry.cache(PER_BLOCK).unwrap().ttl(), Ttl::millis(1500));
        assert_eq!(registry.cache(PERMANENT).unwrap().ttl(), Ttl::Infinite);
    }

    #[test]
    fn test_options_can_enable_caching() {
        let mut options = HashMap::new();
        options.insert(
            "custom".to_string(),
            StrategyOptions {
                ttl: Some(Ttl::Infinite),
            },
        );
        let strategies = vec![Strategy::new("custom", ["eth_getCode"])];
        let registry = StrategyRegistry::build(&strategies, noop_rpc(), &CacheStore::new(), &options);

        assert!(registry.cache("custom").is_some());
    }

    #[test]
    fn test_resolver_registered_for_every_method() {
        let strategies = vec![Strategy::new("router", ["eth_call", "eth_estimateGas"])
            .with_resolver(|method, _| Ok(Some(format!("{method}-policy"))))];
        let registry =
            StrategyRegistry::build(&strategies, noop_rpc(), &CacheStore::new(), &HashMap::new());

        assert_eq!(resolve(&registry, "eth_call").as_deref(), Some("eth_call-policy"));
        assert_eq!(
            resolve(&registry, "eth_estimateGas").as_deref(),
            Some("eth_estimateGas-policy")
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = StrategyRegistry::default();
        assert!(registry.resolver_for("eth_chainId").is_none());
        assert!(registry.cache(PERMANENT).is_none());
    }
}
