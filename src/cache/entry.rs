//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::Arc;

use tokio::time::Instant;

use crate::rpc::JsonRpcResponse;
use crate::strategy::Ttl;

// == Cache Entry ==
/// A settled response together with its timing metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored response, shared by every reader until cloned out
    pub value: Arc<JsonRpcResponse>,
    /// Insertion time
    pub inserted_at: Instant,
    /// Expiration time, None = never expires
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry inserted now, expiring according to `ttl`.
    pub fn new(value: Arc<JsonRpcResponse>, ttl: Ttl) -> Self {
        Self::new_at(value, ttl, Instant::now())
    }

    /// Creates an entry with an explicit insertion time.
    pub fn new_at(value: Arc<JsonRpcResponse>, ttl: Ttl, now: Instant) -> Self {
        let expires_at = match ttl {
            Ttl::Finite(duration) => Some(now + duration),
            Ttl::Infinite => None,
        };

        Self {
            value,
            inserted_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry stays valid up to and including `inserted_at + ttl`; it is
    /// stale only once `now` is strictly past that instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Checks if the entry has expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Age ==
    /// Time elapsed since the entry was inserted.
    pub fn age(&self) -> std::time::Duration {
        self.inserted_at.elapsed()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn response() -> Arc<JsonRpcResponse> {
        Arc::new(JsonRpcResponse::new(1, json!("0x1")))
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_infinite_never_expires() {
        let entry = CacheEntry::new(response(), Ttl::Infinite);

        assert!(entry.expires_at.is_none());
        tokio::time::advance(Duration::from_secs(365 * 24 * 3600)).await;
        assert!(!entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new(response(), Ttl::Finite(Duration::from_millis(6000)));

        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(!entry.is_expired());
        assert_eq!(entry.age(), Duration::from_millis(1000));

        tokio::time::advance(Duration::from_millis(9000)).await;
        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let ttl = Duration::from_millis(500);
        let entry = CacheEntry::new_at(response(), Ttl::Finite(ttl), now);

        // Still valid exactly at inserted_at + ttl
        assert!(!entry.is_expired_at(now + ttl));
        assert!(entry.is_expired_at(now + ttl + Duration::from_millis(1)));
    }

    #[test]
    fn test_zero_ttl_expires_immediately_after() {
        let now = Instant::now();
        let entry = CacheEntry::new_at(response(), Ttl::Finite(Duration::ZERO), now);

        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_nanos(1)));
    }
}
