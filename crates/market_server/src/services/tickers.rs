use std::sync::Arc;

use market_core::cache::TtlCache;
use serde::{Deserialize, Serialize};

use super::{CachePolicy, Cached, SharedClock};
use crate::error::{truncate_chars, ServiceError, MAX_DIAGNOSTIC_CHARS};
use crate::feeds::{FeedError, HistoricalPriceService};

const CACHE_KEY: &str = "all_tickers";

/// Ticker universe of the price warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickersResponse {
    pub tickers: Vec<String>,
}

/// Serves the ticker list from a single-entry daily cache
pub struct TickerOrchestrator {
    prices: Arc<dyn HistoricalPriceService>,
    cache: TtlCache<String, Arc<TickersResponse>, SharedClock>,
}

impl TickerOrchestrator {
    pub fn new(prices: Arc<dyn HistoricalPriceService>, clock: SharedClock) -> Self {
        Self {
            prices,
            cache: CachePolicy::TICKERS.build(clock),
        }
    }

    pub async fn tickers(&self) -> Result<Cached<Arc<TickersResponse>>, ServiceError> {
        if let Some(cached) = self.cache.get(CACHE_KEY) {
            tracing::info!(count = cached.tickers.len(), "list_tickers cache_hit");
            return Ok(Cached::hit(cached));
        }

        let tickers = self.prices.tickers().await.map_err(|e| {
            tracing::error!(
                error = %truncate_chars(&e.to_string(), MAX_DIAGNOSTIC_CHARS),
                "list_tickers failed"
            );
            match e {
                FeedError::Transport(_) => {
                    ServiceError::Unavailable("Price warehouse temporarily unavailable".to_string())
                }
                _ => ServiceError::Unexpected("Failed to fetch tickers".to_string()),
            }
        })?;

        let response = Arc::new(TickersResponse { tickers });
        self.cache.set(CACHE_KEY.to_string(), response.clone());
        tracing::info!(count = response.tickers.len(), "list_tickers cache_miss");
        Ok(Cached::miss(response))
    }
}
