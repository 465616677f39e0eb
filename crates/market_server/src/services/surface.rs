use std::sync::Arc;

use chrono::NaiveDate;
use market_core::cache::TtlCache;
use market_core::market_data::surfaces::expiration_ttm;
use market_core::market_data::{IvSurfaceGrid, QuoteFilter, SurfaceBuilder, SurfaceSide};
use serde::{Deserialize, Serialize};

use super::{CachePolicy, Cached, SharedClock};
use crate::error::{truncate_chars, ServiceError, MAX_DIAGNOSTIC_CHARS};
use crate::feeds::{FeedError, OptionsChainService};

pub const NO_OPTIONS_DETAIL: &str = "No options chain available";
const UPSTREAM_UNAVAILABLE: &str = "Yahoo Finance temporarily unavailable";
const SURFACE_FAILED: &str = "Failed to fetch IV surface";

/// Limit for per-expiration failure diagnostics.
const EXPIRATION_ERROR_CHARS: usize = 100;

/// Implied-volatility surface of one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvSurfaceResponse {
    pub ticker: String,
    pub surface: SurfaceSide,
    #[serde(flatten)]
    pub grid: IvSurfaceGrid,
}

/// Grids call-side implied volatilities across every listed expiration
pub struct SurfaceOrchestrator {
    options: Arc<dyn OptionsChainService>,
    filter: QuoteFilter,
    builder: SurfaceBuilder,
    cache: TtlCache<String, Arc<IvSurfaceResponse>, SharedClock>,
}

impl SurfaceOrchestrator {
    pub fn new(options: Arc<dyn OptionsChainService>, clock: SharedClock) -> Self {
        Self {
            options,
            filter: QuoteFilter::default(),
            builder: SurfaceBuilder::default(),
            cache: CachePolicy::IV_SURFACE.build(clock),
        }
    }

    pub async fn surface(
        &self,
        ticker: &str,
        side: SurfaceSide,
        today: NaiveDate,
    ) -> Result<Cached<Arc<IvSurfaceResponse>>, ServiceError> {
        let key = format!("{ticker}:{side}");
        if let Some(cached) = self.cache.get(&key) {
            tracing::info!(ticker, surface = %side, "iv_surface cache_hit");
            return Ok(Cached::hit(cached));
        }

        let expirations = self.options.expirations(ticker).await.map_err(|e| match e {
            FeedError::NotFound(_) => ServiceError::NotFound(NO_OPTIONS_DETAIL.to_string()),
            other => {
                tracing::error!(
                    ticker,
                    error = %truncate_chars(&other.to_string(), EXPIRATION_ERROR_CHARS),
                    "iv_surface fetch_expirations_failed"
                );
                ServiceError::Unavailable(UPSTREAM_UNAVAILABLE.to_string())
            }
        })?;
        if expirations.is_empty() {
            return Err(ServiceError::NotFound(NO_OPTIONS_DETAIL.to_string()));
        }

        let mut quotes = Vec::new();
        for expiry in expirations {
            let Some(ttm) = expiration_ttm(today, expiry) else {
                continue;
            };
            match self.options.calls(ticker, expiry).await {
                Ok(contracts) => quotes.extend(self.filter.collect(&contracts, ttm)),
                Err(e) => tracing::warn!(
                    ticker,
                    expiration = %expiry,
                    error = %truncate_chars(&e.to_string(), EXPIRATION_ERROR_CHARS),
                    "iv_surface expiration_failed"
                ),
            }
        }
        if quotes.is_empty() {
            return Err(ServiceError::NotFound(NO_OPTIONS_DETAIL.to_string()));
        }

        let grid_size = format!(
            "{}x{}",
            self.builder.num_strikes, self.builder.num_maturities
        );
        tracing::info!(
            ticker,
            raw_points = quotes.len(),
            grid_size = %grid_size,
            "iv_surface interpolating"
        );

        let grid = self.builder.build(&quotes).map_err(|e| {
            tracing::error!(
                ticker,
                surface = %side,
                error = %truncate_chars(&e.to_string(), MAX_DIAGNOSTIC_CHARS),
                "iv_surface failed"
            );
            ServiceError::Unexpected(SURFACE_FAILED.to_string())
        })?;

        let response = Arc::new(IvSurfaceResponse {
            ticker: ticker.to_string(),
            surface: side,
            grid,
        });
        self.cache.set(key, response.clone());
        tracing::info!(
            ticker,
            surface = %side,
            raw_points = quotes.len(),
            grid_size = %grid_size,
            "iv_surface cache_miss"
        );
        Ok(Cached::miss(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeOptions;
    use chrono::{Days, Utc};
    use market_core::cache::ManualClock;
    use market_core::market_data::OptionContract;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn orchestrator(options: Arc<FakeOptions>) -> (SurfaceOrchestrator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (SurfaceOrchestrator::new(options, clock.clone()), clock)
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn contract(strike: f64, oi: i64, iv: f64) -> OptionContract {
        OptionContract {
            strike,
            open_interest: Some(oi),
            implied_volatility: Some(iv),
        }
    }

    #[tokio::test]
    async fn test_builds_full_grid_and_caches_per_side() {
        let options = Arc::new(FakeOptions::planar());
        let (surfaces, _) = orchestrator(options.clone());

        let mid = surfaces.surface("SPY", SurfaceSide::Mid, today()).await.unwrap();
        assert!(!mid.cache_hit);
        assert_eq!(mid.value.surface, SurfaceSide::Mid);
        assert_eq!(mid.value.grid.strikes.len(), 20);
        assert_eq!(mid.value.grid.maturities.len(), 20);
        assert_eq!(mid.value.grid.strikes[0], 80.0);
        assert_eq!(mid.value.grid.strikes[19], 120.0);

        let again = surfaces.surface("SPY", SurfaceSide::Mid, today()).await.unwrap();
        assert!(again.cache_hit);

        let bid = surfaces.surface("SPY", SurfaceSide::Bid, today()).await.unwrap();
        assert!(!bid.cache_hit);
        assert_eq!(bid.value.grid, mid.value.grid);
        assert_eq!(options.expiration_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_json_shape_is_flat() {
        let (surfaces, _) = orchestrator(Arc::new(FakeOptions::planar()));
        let surface = surfaces.surface("SPY", SurfaceSide::Ask, today()).await.unwrap();

        let json = serde_json::to_value(&*surface.value).unwrap();
        assert_eq!(json["ticker"], "SPY");
        assert_eq!(json["surface"], "ask");
        assert_eq!(json["strikes"].as_array().unwrap().len(), 20);
        assert_eq!(json["values"].as_array().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_no_expirations_is_not_found() {
        let (surfaces, _) = orchestrator(Arc::new(FakeOptions::new(Ok(Vec::new()))));
        assert_eq!(
            surfaces.surface("XYZ", SurfaceSide::Mid, today()).await.unwrap_err(),
            ServiceError::NotFound(NO_OPTIONS_DETAIL.into())
        );
    }

    #[tokio::test]
    async fn test_expiration_listing_failure_is_unavailable() {
        let options = FakeOptions::new(Err(FeedError::Transport("HTTP 429".into())));
        let (surfaces, _) = orchestrator(Arc::new(options));
        assert_eq!(
            surfaces.surface("SPY", SurfaceSide::Mid, today()).await.unwrap_err(),
            ServiceError::Unavailable(UPSTREAM_UNAVAILABLE.into())
        );
    }

    #[tokio::test]
    async fn test_failed_and_expired_expirations_are_skipped() {
        let past = today() - Days::new(3);
        let broken = today() + Days::new(10);
        let good = [today() + Days::new(30), today() + Days::new(90)];
        let rows: Vec<OptionContract> = (0..5)
            .map(|k| contract(90.0 + 5.0 * k as f64, 500, 0.25))
            .collect();

        let options = FakeOptions::new(Ok(vec![past, broken, good[0], good[1]]))
            .with_chain(past, Ok(rows.clone()))
            .with_chain(broken, Err(FeedError::Decode("bad json".into())))
            .with_chain(good[0], Ok(rows.clone()))
            .with_chain(good[1], Ok(rows));
        let options = Arc::new(options);
        let (surfaces, _) = orchestrator(options.clone());

        let surface = surfaces.surface("SPY", SurfaceSide::Mid, today()).await.unwrap();
        // The past expiration is never requested
        assert_eq!(options.chain_calls.load(Ordering::SeqCst), 3);
        assert_eq!(surface.value.grid.maturities[0], 30.0 / 365.0);
        assert!(surface.value.grid.filled_count() > 0);
    }

    #[tokio::test]
    async fn test_illiquid_chain_is_not_found() {
        let expiry = today() + Days::new(30);
        let options = FakeOptions::new(Ok(vec![expiry]))
            .with_chain(expiry, Ok(vec![contract(100.0, 49, 0.2), contract(105.0, 10, 0.2)]));
        let (surfaces, _) = orchestrator(Arc::new(options));
        assert!(matches!(
            surfaces.surface("SPY", SurfaceSide::Mid, today()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_collinear_samples_are_unexpected() {
        let expiry = today() + Days::new(30);
        let rows = (0..4).map(|k| contract(100.0 + k as f64, 100, 0.2)).collect();
        let options = FakeOptions::new(Ok(vec![expiry])).with_chain(expiry, Ok(rows));
        let (surfaces, _) = orchestrator(Arc::new(options));
        assert_eq!(
            surfaces.surface("SPY", SurfaceSide::Mid, today()).await.unwrap_err(),
            ServiceError::Unexpected(SURFACE_FAILED.into())
        );
    }

    #[tokio::test]
    async fn test_expires_after_ten_minutes() {
        let options = Arc::new(FakeOptions::planar());
        let (surfaces, clock) = orchestrator(options.clone());

        surfaces.surface("SPY", SurfaceSide::Mid, today()).await.unwrap();
        clock.advance(Duration::from_secs(10 * 60));
        assert!(!surfaces.surface("SPY", SurfaceSide::Mid, today()).await.unwrap().cache_hit);
        assert_eq!(options.expiration_calls.load(Ordering::SeqCst), 2);
    }
}
