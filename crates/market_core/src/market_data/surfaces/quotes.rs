//! Option quote filtering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::time_to_maturity;

/// Minimum open interest for a contract to contribute to a surface.
pub const DEFAULT_MIN_OPEN_INTEREST: i64 = 50;

/// One call-side contract row from an option chain.
///
/// Feeds frequently omit open interest or implied volatility, so both are
/// optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Strike price
    pub strike: f64,
    /// Open interest, if reported
    pub open_interest: Option<i64>,
    /// Implied volatility as a decimal, if reported
    pub implied_volatility: Option<f64>,
}

/// A clean `(strike, ttm, implied_vol)` sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvQuote {
    /// Strike price, positive
    pub strike: f64,
    /// Time to maturity in years, positive
    pub ttm: f64,
    /// Implied volatility, positive and finite
    pub implied_vol: f64,
    /// Open interest at or above the filter threshold
    pub open_interest: i64,
}

/// Time to maturity of an expiration seen from `today`, or `None` when the
/// expiration is today or already past.
///
/// ```
/// use chrono::NaiveDate;
/// use market_core::market_data::surfaces::expiration_ttm;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let expiry = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
/// assert!((expiration_ttm(today, expiry).unwrap() - 30.0 / 365.0).abs() < 1e-15);
/// assert!(expiration_ttm(today, today).is_none());
/// ```
pub fn expiration_ttm(today: NaiveDate, expiry: NaiveDate) -> Option<f64> {
    let ttm = time_to_maturity(today, expiry);
    (ttm > 0.0).then_some(ttm)
}

/// Accepts a contract iff its strike is positive, its open interest is
/// present and at least `min_open_interest`, and its implied volatility is
/// present, finite and positive.
///
/// # Example
///
/// ```
/// use market_core::market_data::surfaces::{OptionContract, QuoteFilter};
///
/// let filter = QuoteFilter::default();
/// let row = OptionContract { strike: 100.0, open_interest: Some(50), implied_volatility: Some(0.2) };
/// assert!(filter.accept(&row, 0.5).is_some());
///
/// let thin = OptionContract { open_interest: Some(49), ..row };
/// assert!(filter.accept(&thin, 0.5).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteFilter {
    /// Minimum accepted open interest, inclusive
    pub min_open_interest: i64,
}

impl Default for QuoteFilter {
    fn default() -> Self {
        Self {
            min_open_interest: DEFAULT_MIN_OPEN_INTEREST,
        }
    }
}

impl QuoteFilter {
    /// Filter with a custom open-interest threshold.
    pub fn new(min_open_interest: i64) -> Self {
        Self { min_open_interest }
    }

    /// Clean sample for `contract` at `ttm`, if it passes every check.
    pub fn accept(&self, contract: &OptionContract, ttm: f64) -> Option<IvQuote> {
        if !contract.strike.is_finite() || contract.strike <= 0.0 {
            return None;
        }
        let open_interest = contract.open_interest.filter(|&oi| oi >= self.min_open_interest)?;
        let implied_vol = contract
            .implied_volatility
            .filter(|iv| iv.is_finite() && *iv > 0.0)?;

        Some(IvQuote {
            strike: contract.strike,
            ttm,
            implied_vol,
            open_interest,
        })
    }

    /// Every accepted sample from one expiration's rows.
    pub fn collect(&self, contracts: &[OptionContract], ttm: f64) -> Vec<IvQuote> {
        contracts
            .iter()
            .filter_map(|c| self.accept(c, ttm))
            .collect()
    }
}
