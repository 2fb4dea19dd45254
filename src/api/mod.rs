//! API Module
//!
//! HTTP handlers and routing for the caching JSON-RPC proxy.
//!
//! # Endpoints
//! - `POST /` - JSON-RPC requests, served through the cache
//! - `GET /stats` - Per-policy cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
