//! Calendar helpers for market-data derivation.
//!
//! This module provides:
//! - [`time_to_maturity`]: ACT/365 year fraction to an option expiry, floored at zero
//! - [`days_since_year_start`]: Calendar days elapsed in the current year
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use market_core::types::time::time_to_maturity;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let expiry = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//! assert!((time_to_maturity(today, expiry) - 365.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, NaiveDate};

/// Days per year used for option time-to-maturity.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Year fraction from `today` to `expiry` as `max(days, 0) / 365`.
///
/// Expired contracts map to `0.0`, never to a negative value.
pub fn time_to_maturity(today: NaiveDate, expiry: NaiveDate) -> f64 {
    let days = (expiry - today).num_days().max(0);
    days as f64 / DAYS_PER_YEAR
}

/// Number of calendar days elapsed between January 1st and `today`.
///
/// January 1st itself returns `0`.
pub fn days_since_year_start(today: NaiveDate) -> i64 {
    // ordinal0 is zero-based day of year
    i64::from(today.ordinal0())
}
