//! Derivation orchestrators
//!
//! Every derived product follows the same shape: build a cache key from
//! the discriminating request parameters, look it up, and on a miss fetch
//! raw data, build the widest useful product, cache it and return the
//! requested view of it. Each orchestrator owns its [`TtlCache`]; the
//! [`MarketDataService`] owns the orchestrators and is created once at
//! startup.
//!
//! Fetches run outside any cache lock, so concurrent misses on one key may
//! fetch twice; the last `set` wins.

mod history;
mod rates;
mod surface;
mod tickers;

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use market_core::cache::{Clock, SystemClock, TtlCache};
use market_core::market_data::{CurveFamily, CurveType, HistoryRange, SurfaceSide};

use crate::feeds::{HistoricalPriceService, OptionsChainService, RateObservationService};
use crate::error::ServiceError;

pub use history::{HistoryOrchestrator, HistoryResponse};
pub use rates::{RateCurveOrchestrator, RateCurveResponse};
pub use surface::{IvSurfaceResponse, SurfaceOrchestrator, NO_OPTIONS_DETAIL};
pub use tickers::{TickerOrchestrator, TickersResponse};

/// Clock shared by every cache of one service.
pub type SharedClock = Arc<dyn Clock>;

/// A product together with whether it was served from cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub cache_hit: bool,
}

impl<T> Cached<T> {
    /// A value served from cache
    pub fn hit(value: T) -> Self {
        Self {
            value,
            cache_hit: true,
        }
    }

    /// A freshly computed value
    pub fn miss(value: T) -> Self {
        Self {
            value,
            cache_hit: false,
        }
    }
}

/// Capacity and lifetime of one product cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_size: usize,
    pub ttl: Duration,
}

impl CachePolicy {
    pub const TICKERS: Self = Self {
        max_size: 1,
        ttl: Duration::from_secs(24 * 60 * 60),
    };
    pub const HISTORY: Self = Self {
        max_size: 256,
        ttl: Duration::from_secs(30 * 60),
    };
    pub const RATE_CURVE: Self = Self {
        max_size: 8,
        ttl: Duration::from_secs(60 * 60),
    };
    pub const ZERO_POINTS: Self = Self {
        max_size: 4,
        ttl: Duration::from_secs(60 * 60),
    };
    pub const IV_SURFACE: Self = Self {
        max_size: 128,
        ttl: Duration::from_secs(10 * 60),
    };

    /// Create an empty cache with this policy.
    pub fn build<V: Clone>(&self, clock: SharedClock) -> TtlCache<String, V, SharedClock> {
        TtlCache::with_clock(self.max_size, self.ttl, clock)
    }
}

/// Composition root owning every product cache
pub struct MarketDataService {
    tickers: TickerOrchestrator,
    history: HistoryOrchestrator,
    rates: RateCurveOrchestrator,
    surfaces: SurfaceOrchestrator,
}

impl MarketDataService {
    /// Create the service with wall-clock caches.
    pub fn new(
        prices: Arc<dyn HistoricalPriceService>,
        rates: Arc<dyn RateObservationService>,
        options: Arc<dyn OptionsChainService>,
    ) -> Self {
        Self::with_clock(prices, rates, options, Arc::new(SystemClock))
    }

    /// Create the service with caches reading time from `clock`.
    pub fn with_clock(
        prices: Arc<dyn HistoricalPriceService>,
        rates: Arc<dyn RateObservationService>,
        options: Arc<dyn OptionsChainService>,
        clock: SharedClock,
    ) -> Self {
        Self {
            tickers: TickerOrchestrator::new(prices.clone(), clock.clone()),
            history: HistoryOrchestrator::new(prices, clock.clone()),
            rates: RateCurveOrchestrator::new(rates, clock.clone()),
            surfaces: SurfaceOrchestrator::new(options, clock),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// All known tickers
    pub async fn tickers(&self) -> Result<Cached<Arc<TickersResponse>>, ServiceError> {
        self.tickers.tickers().await
    }

    /// Closing prices for `ticker` over `range`
    pub async fn history(
        &self,
        ticker: &str,
        range: HistoryRange,
    ) -> Result<Cached<HistoryResponse>, ServiceError> {
        self.history.history(ticker, range, Self::today()).await
    }

    /// Zero or forward rate curve
    pub async fn rate_curve(
        &self,
        family: CurveFamily,
        curve_type: CurveType,
        fixed_period_years: f64,
    ) -> Result<Cached<Arc<RateCurveResponse>>, ServiceError> {
        self.rates.curve(family, curve_type, fixed_period_years).await
    }

    /// Gridded implied-volatility surface
    pub async fn iv_surface(
        &self,
        ticker: &str,
        side: SurfaceSide,
    ) -> Result<Cached<Arc<IvSurfaceResponse>>, ServiceError> {
        self.surfaces.surface(ticker, side, Self::today()).await
    }
}
