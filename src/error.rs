//! Error types for the RPC cache
//!
//! Provides unified error handling using thiserror.

use std::any::Any;

use thiserror::Error;

// == JSON-RPC Error Codes ==
/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// Message used when an internal failure carries no message of its own.
pub const DEFAULT_INTERNAL_MESSAGE: &str = "Internal error";

// == RPC Cache Error Enum ==
/// Unified error type for the RPC cache.
///
/// Errors are `Clone` so a single upstream failure can be handed to every
/// caller waiting on the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcCacheError {
    /// No strategy claims the method and passthrough is disabled
    #[error("Method not found")]
    MethodNotFound,

    /// Failure raised while resolving or dispatching a call
    #[error("{0}")]
    Internal(String),

    /// Error object returned by the upstream node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The upstream node could not be reached or answered garbage
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RpcCacheError {
    /// Builds an internal error, falling back to a generic message when the
    /// original one is empty.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            RpcCacheError::Internal(DEFAULT_INTERNAL_MESSAGE.to_string())
        } else {
            RpcCacheError::Internal(message)
        }
    }

    /// Converts a caught panic payload into an internal error.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        if let Some(message) = payload.downcast_ref::<&str>() {
            Self::internal(*message)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            Self::internal(message.as_str())
        } else {
            Self::internal("")
        }
    }

    /// Returns the JSON-RPC classification code for this error.
    pub fn code(&self) -> i64 {
        match self {
            RpcCacheError::MethodNotFound => METHOD_NOT_FOUND,
            RpcCacheError::Internal(_) => INTERNAL_ERROR,
            RpcCacheError::Rpc { code, .. } => *code,
            RpcCacheError::Transport(_) => INTERNAL_ERROR,
        }
    }
}

impl From<reqwest::Error> for RpcCacheError {
    fn from(err: reqwest::Error) -> Self {
        RpcCacheError::Transport(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the RPC cache.
pub type Result<T> = std::result::Result<T, RpcCacheError>;
