//! REST service for derived market data
//!
//! Exposes cached ticker lists, close-price history, zero and forward rate
//! curves and implied-volatility surfaces built by `market_core`, plus a
//! pricing boundary that forwards instruments to an external engine.
//!
//! Upstream sources sit behind the traits in [`feeds`]; each orchestrator in
//! [`services`] owns its TTL caches.

pub mod config;
pub mod error;
pub mod feeds;
pub mod middleware;
pub mod pricing;
pub mod routes;
pub mod server;
pub mod services;

#[cfg(test)]
mod testing;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
