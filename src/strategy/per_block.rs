//! Per-Block Strategy
//!
//! Methods whose results can change with every new block, or after a shallow
//! reorg. They are cached for half a block interval so an entry filled
//! between two blocks never outlives the next one.

use std::time::Duration;

use super::{Strategy, Ttl};

/// Name of the per-block policy.
pub const PER_BLOCK: &str = "perBlock";

/// Half of a ~12s block interval.
pub const PER_BLOCK_TTL: Duration = Duration::from_millis(6000);

/// Could be cached permanently when pinned to an old block, but results for
/// recent blocks may change after a reorg.
const REORG_SENSITIVE_METHODS: &[&str] = &[
    "eth_call",
    "eth_getBalance",
    "eth_getBlockByNumber",
    "eth_getBlockTransactionCountByNumber",
    "eth_getCode",
    "eth_getLogs",
    "eth_getProof",
    "eth_getRawTransactionByBlockNumberAndIndex",
    "eth_getStorageAt",
    "eth_getTransactionByBlockNumberAndIndex",
    "eth_getTransactionCount",
    "eth_getTransactionReceipt",
    "eth_getUncleByBlockNumberAndIndex",
    "eth_getUncleCountByBlockNumber",
];

/// Valid at most until the next block is mined.
const ONCE_PER_BLOCK_METHODS: &[&str] = &[
    "eth_blockNumber",
    "eth_feeHistory",
    "eth_getFilterChanges",
    "eth_getFilterLogs",
    "eth_getWork",
];

/// Builds the per-block strategy.
pub fn per_block_strategy() -> Strategy {
    let methods = REORG_SENSITIVE_METHODS
        .iter()
        .chain(ONCE_PER_BLOCK_METHODS)
        .copied();

    Strategy::new(PER_BLOCK, methods).with_ttl(Ttl::Finite(PER_BLOCK_TTL))
}
