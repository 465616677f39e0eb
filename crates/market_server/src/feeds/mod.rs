//! Upstream data collaborators
//!
//! Each external source sits behind an `async_trait` so the orchestrators
//! can be exercised against in-memory fakes:
//! - [`RateObservationService`]: latest value of a rate series (FRED)
//! - [`OptionsChainService`]: option expirations and call rows (Yahoo Finance)
//! - [`HistoricalPriceService`]: ticker universe and daily closes (CSV warehouse)

pub mod fred;
pub mod warehouse;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;
use market_core::market_data::OptionContract;
use thiserror::Error;

pub use fred::FredClient;
pub use warehouse::CsvWarehouse;
pub use yahoo::YahooOptionsClient;

/// Errors reported by upstream collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl FeedError {
    /// Map a `reqwest` failure, distinguishing timeouts and bad statuses.
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Transport("request timed out".to_string())
        } else if let Some(status) = e.status() {
            FeedError::Transport(format!("HTTP {}", status.as_u16()))
        } else if e.is_decode() {
            FeedError::Decode(e.to_string())
        } else {
            FeedError::Transport(e.to_string())
        }
    }
}

/// Source of the most recent observation of a rate series
#[async_trait]
pub trait RateObservationService: Send + Sync {
    /// Latest numeric observation, or `None` if every recent observation is
    /// missing or non-numeric.
    async fn latest_observation(&self, series_id: &str) -> Result<Option<f64>, FeedError>;
}

/// Source of listed option chains
#[async_trait]
pub trait OptionsChainService: Send + Sync {
    /// Listed expiration dates; empty when the ticker has no chain.
    async fn expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>, FeedError>;

    /// Call-side contracts for one expiration.
    async fn calls(&self, ticker: &str, expiration: NaiveDate)
        -> Result<Vec<OptionContract>, FeedError>;
}

/// Tabular store of daily closing prices
#[async_trait]
pub trait HistoricalPriceService: Send + Sync {
    /// Distinct tickers in ascending order.
    async fn tickers(&self) -> Result<Vec<String>, FeedError>;

    /// Up to `limit` most recent `(date, close)` rows, newest first.
    async fn history(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>, FeedError>;
}
