//! In-memory collaborators for orchestrator and router tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use market_core::market_data::OptionContract;
use tokio::sync::Barrier;

use crate::feeds::{FeedError, HistoricalPriceService, OptionsChainService, RateObservationService};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Price warehouse holding a fixed set of daily series.
#[derive(Default)]
pub struct FakePrices {
    series: HashMap<String, Vec<(NaiveDate, Option<f64>)>>,
    failure: Option<FeedError>,
    gate: Option<Arc<Barrier>>,
    pub ticker_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl FakePrices {
    /// `n` consecutive daily closes `100, 101, ...` starting 2023-01-02.
    pub fn with_series(ticker: &str, n: usize) -> Self {
        Self::default().add_series(ticker, n)
    }

    pub fn add_series(mut self, ticker: &str, n: usize) -> Self {
        let start = date(2023, 1, 2);
        let rows = (0..n)
            .map(|i| (start + Days::new(i as u64), Some(100.0 + i as f64)))
            .collect();
        self.series.insert(ticker.to_string(), rows);
        self
    }

    pub fn with_rows(mut self, ticker: &str, rows: Vec<(NaiveDate, Option<f64>)>) -> Self {
        self.series.insert(ticker.to_string(), rows);
        self
    }

    pub fn failing(error: FeedError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Hold every fetch until `parties` fetches are in flight.
    pub fn gated(mut self, parties: usize) -> Self {
        self.gate = Some(Arc::new(Barrier::new(parties)));
        self
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
    }
}

#[async_trait]
impl HistoricalPriceService for FakePrices {
    async fn tickers(&self) -> Result<Vec<String>, FeedError> {
        let call = self.ticker_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut tickers: Vec<String> = self.series.keys().cloned().collect();
        tickers.sort();
        // Distinguishes concurrent fetches in race tests
        if self.gate.is_some() {
            tickers.push(format!("CALL{call}"));
        }
        Ok(tickers)
    }

    async fn history(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>, FeedError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate().await;
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut rows = self.series.get(ticker).cloned().unwrap_or_default();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows.truncate(limit);
        Ok(rows)
    }
}

/// Rate source answering every series with a fixed rate unless overridden.
pub struct FakeRates {
    default: Option<f64>,
    overrides: HashMap<String, Result<Option<f64>, FeedError>>,
    pub calls: AtomicUsize,
}

impl FakeRates {
    pub fn flat(rate: f64) -> Self {
        Self {
            default: Some(rate),
            overrides: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            default: None,
            overrides: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_value(mut self, series: &str, value: Option<f64>) -> Self {
        self.overrides.insert(series.to_string(), Ok(value));
        self
    }

    pub fn with_error(mut self, series: &str, error: FeedError) -> Self {
        self.overrides.insert(series.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl RateObservationService for FakeRates {
    async fn latest_observation(&self, series_id: &str) -> Result<Option<f64>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.overrides.get(series_id) {
            Some(result) => result.clone(),
            None => Ok(self.default),
        }
    }
}

/// Option chain source with per-expiration call rows.
pub struct FakeOptions {
    expirations: Result<Vec<NaiveDate>, FeedError>,
    chains: HashMap<NaiveDate, Result<Vec<OptionContract>, FeedError>>,
    pub expiration_calls: AtomicUsize,
    pub chain_calls: AtomicUsize,
}

impl FakeOptions {
    pub fn new(expirations: Result<Vec<NaiveDate>, FeedError>) -> Self {
        Self {
            expirations,
            chains: HashMap::new(),
            expiration_calls: AtomicUsize::new(0),
            chain_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_chain(mut self, expiry: NaiveDate, chain: Result<Vec<OptionContract>, FeedError>) -> Self {
        self.chains.insert(expiry, chain);
        self
    }

    /// Three expirations after today, nine liquid strikes each, with
    /// volatility linear in strike and maturity.
    pub fn planar() -> Self {
        let today = Utc::now().date_naive();
        let expiries: Vec<NaiveDate> = [30u64, 91, 182]
            .iter()
            .map(|d| today + Days::new(*d))
            .collect();
        let mut fake = Self::new(Ok(expiries.clone()));
        for (i, expiry) in expiries.into_iter().enumerate() {
            let rows = (0..9)
                .map(|k| {
                    let strike = 80.0 + 5.0 * k as f64;
                    OptionContract {
                        strike,
                        open_interest: Some(100),
                        implied_volatility: Some(0.2 + 0.001 * (strike - 100.0) + 0.01 * i as f64),
                    }
                })
                .collect();
            fake = fake.with_chain(expiry, Ok(rows));
        }
        fake
    }
}

#[async_trait]
impl OptionsChainService for FakeOptions {
    async fn expirations(&self, _ticker: &str) -> Result<Vec<NaiveDate>, FeedError> {
        self.expiration_calls.fetch_add(1, Ordering::SeqCst);
        self.expirations.clone()
    }

    async fn calls(
        &self,
        _ticker: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionContract>, FeedError> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        self.chains.get(&expiration).cloned().unwrap_or(Ok(Vec::new()))
    }
}

/// Application state wired to in-memory collaborators.
pub fn test_state(config: crate::config::ServerConfig) -> crate::routes::AppState {
    use crate::pricing::{DisabledPricingProvider, PricingService, DEFAULT_PRICING_TIMEOUT};
    use crate::services::MarketDataService;

    let market = MarketDataService::new(
        Arc::new(FakePrices::with_series("AAPL", 600).add_series("MSFT", 40)),
        Arc::new(FakeRates::flat(4.0)),
        Arc::new(FakeOptions::planar()),
    );
    let pricing = PricingService::new(Arc::new(DisabledPricingProvider), DEFAULT_PRICING_TIMEOUT);
    crate::routes::AppState::new(Arc::new(config), Arc::new(market), pricing)
}
