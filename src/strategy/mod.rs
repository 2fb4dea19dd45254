//! Strategy Module
//!
//! A strategy is a named caching policy: the methods it claims, how long their
//! results may be reused, and optionally a resolver that redirects individual
//! calls to another policy.

mod per_block;
mod permanent;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

pub use per_block::{per_block_strategy, PER_BLOCK, PER_BLOCK_TTL};
pub use permanent::{permanent_strategy, PERMANENT};

// == TTL ==
/// How long a cached result stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Valid for the given duration after insertion
    Finite(Duration),
    /// Never expires
    Infinite,
}

impl Ttl {
    /// Shorthand for a finite TTL in milliseconds.
    pub fn millis(ms: u64) -> Self {
        Ttl::Finite(Duration::from_millis(ms))
    }
}

// == Resolver ==
/// Picks the policy for a single call from its method and params.
///
/// `Ok(None)` leaves the call unclaimed; an error is reported to the caller as
/// an internal error.
pub type Resolver = Arc<dyn Fn(&str, &[Value]) -> anyhow::Result<Option<String>> + Send + Sync>;

// == Strategy ==
/// A named caching policy.
#[derive(Clone)]
pub struct Strategy {
    /// Policy name, unique within a registry
    pub name: String,
    /// Methods this strategy claims
    pub methods: Vec<String>,
    /// Result lifetime; None means results are not cached under this name
    pub ttl: Option<Ttl>,
    /// Optional per-call redirection to another policy
    pub resolver: Option<Resolver>,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("ttl", &self.ttl)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Strategy {
    /// Creates a strategy claiming `methods` with no caching and no resolver.
    pub fn new<I, S>(name: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            methods: methods.into_iter().map(Into::into).collect(),
            ttl: None,
            resolver: None,
        }
    }

    /// Sets the TTL of results cached under this strategy's name.
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Installs a resolver choosing the policy per call.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str, &[Value]) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Returns the resolver used for this strategy's methods: its own, or one
    /// that always answers with the strategy's name.
    pub fn effective_resolver(&self) -> Resolver {
        match &self.resolver {
            Some(resolver) => Arc::clone(resolver),
            None => {
                let name = self.name.clone();
                Arc::new(
                    move |_method: &str, _params: &[Value]| -> anyhow::Result<Option<String>> {
                        Ok(Some(name.clone()))
                    },
                )
            }
        }
    }
}

// == Strategy Options ==
/// Per-strategy settings forwarded by name from the cache options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyOptions {
    /// Replaces the strategy's own TTL
    pub ttl: Option<Ttl>,
}

/// The built-in strategies, in registration order.
pub fn default_strategies() -> Vec<Strategy> {
    vec![per_block_strategy(), permanent_strategy()]
}
