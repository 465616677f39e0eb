use std::sync::Arc;

use chrono::NaiveDate;
use market_core::cache::TtlCache;
use market_core::market_data::{HistoryPoint, HistoryRange, HistorySeries};
use market_core::market_data::history::MAX_HISTORY_ROWS;
use serde::{Deserialize, Serialize};

use super::{CachePolicy, Cached, SharedClock};
use crate::error::{truncate_chars, ServiceError, MAX_DIAGNOSTIC_CHARS};
use crate::feeds::{FeedError, HistoricalPriceService};

/// Closing prices of one ticker, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub ticker: String,
    pub points: Vec<HistoryPoint>,
}

/// Serves price-history windows sliced from one cached two-year series
/// per ticker
pub struct HistoryOrchestrator {
    prices: Arc<dyn HistoricalPriceService>,
    cache: TtlCache<String, Arc<HistorySeries>, SharedClock>,
}

impl HistoryOrchestrator {
    pub fn new(prices: Arc<dyn HistoricalPriceService>, clock: SharedClock) -> Self {
        Self {
            prices,
            cache: CachePolicy::HISTORY.build(clock),
        }
    }

    /// The last `range.limit(today)` closes of `ticker`.
    ///
    /// A cached series shorter than the requested window is refetched.
    pub async fn history(
        &self,
        ticker: &str,
        range: HistoryRange,
        today: NaiveDate,
    ) -> Result<Cached<HistoryResponse>, ServiceError> {
        let limit = range.limit(today);

        if let Some(series) = self.cache.get(ticker).filter(|s| s.covers(limit)) {
            let points = series.tail(limit).to_vec();
            tracing::info!(
                ticker,
                range = %range,
                points = points.len(),
                "market_history cache_hit"
            );
            return Ok(Cached::hit(HistoryResponse {
                ticker: ticker.to_string(),
                points,
            }));
        }

        let rows = self
            .prices
            .history(ticker, MAX_HISTORY_ROWS)
            .await
            .map_err(|e| {
                tracing::error!(
                    ticker,
                    range = %range,
                    error = %truncate_chars(&e.to_string(), MAX_DIAGNOSTIC_CHARS),
                    "market_history failed"
                );
                match e {
                    FeedError::Transport(_) => ServiceError::Unavailable(
                        "Price warehouse temporarily unavailable".to_string(),
                    ),
                    _ => ServiceError::Unexpected("Price history query failed".to_string()),
                }
            })?;

        let series = HistorySeries::from_rows(rows);
        if series.is_empty() {
            tracing::info!(ticker, range = %range, "market_history empty");
            return Err(ServiceError::NotFound(format!(
                "No price history for {ticker}"
            )));
        }

        let series = Arc::new(series);
        self.cache.set(ticker.to_string(), series.clone());

        let points = series.tail(limit).to_vec();
        tracing::info!(
            ticker,
            range = %range,
            cached_points = series.len(),
            returned_points = points.len(),
            "market_history cache_miss"
        );
        Ok(Cached::miss(HistoryResponse {
            ticker: ticker.to_string(),
            points,
        }))
    }
}
