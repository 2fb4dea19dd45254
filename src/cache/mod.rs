//! Cache Module
//!
//! Provides key derivation, TTL-bound entries, shared storage and the
//! per-policy memoizing cache with request coalescing.

mod entry;
mod key;
mod memo;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::cache_key;
pub use memo::MemoCache;
pub use stats::CacheStats;
pub use store::CacheStore;
