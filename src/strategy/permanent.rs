//! Permanent Strategy
//!
//! Methods whose results never change once produced.

use super::{Strategy, Ttl};

/// Name of the permanent policy.
pub const PERMANENT: &str = "permanent";

/// Results keyed by an immutable block/transaction hash or chain identity.
const METHODS: &[&str] = &[
    "eth_chainId",
    "eth_getBlockByHash",
    "eth_getBlockTransactionCountByHash",
    "eth_getRawTransactionByBlockHashAndIndex",
    "eth_getRawTransactionByHash",
    "eth_getTransactionByBlockHashAndIndex",
    "eth_getTransactionByHash",
    "eth_getUncleByBlockHashAndIndex",
    "eth_getUncleCountByBlockHash",
    "net_version",
    // Pure function of its input; could be computed locally.
    "web3_sha3",
];

/// Builds the permanent strategy: cached forever.
pub fn permanent_strategy() -> Strategy {
    Strategy::new(PERMANENT, METHODS.iter().copied()).with_ttl(Ttl::Infinite)
}
