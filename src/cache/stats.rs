//! Cache Statistics Module
//!
//! Tracks per-policy cache metrics: hits, misses, coalesced waits and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics for one policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls answered from a settled entry
    pub hits: u64,
    /// Calls that started a new underlying request
    pub misses: u64,
    /// Calls that joined a request already in flight
    pub coalesced: u64,
    /// Settled entries found stale and recomputed
    pub expired: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of calls that did not trigger an underlying request.
    ///
    /// Returns (hits + coalesced) / total, or 0.0 if no calls have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.coalesced;
        if total == 0 {
            0.0
        } else {
            (self.hits + self.coalesced) as f64 / total as f64
        }
    }

    // == Underlying Calls ==
    /// Number of requests this policy sent to the underlying RPC.
    pub fn upstream_calls(&self) -> u64 {
        self.misses
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }

    pub fn record_expired(&mut self) {
        self.expired += 1;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.coalesced, 0);
        assert_eq!(stats.expired, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_coalesced_as_saved() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_coalesced();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(stats.upstream_calls(), 1);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_record_expired() {
        let mut stats = CacheStats::new();
        stats.record_expired();
        stats.record_expired();
        assert_eq!(stats.expired, 2);
    }
}
