//! Curve families and their constituent rate series.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::market_data::error::MarketDataError;

const SOFR_SERIES: &[(f64, &str)] = &[
    (1.0 / 360.0, "SOFR"),
    (1.0 / 12.0, "SOFR30DAYAVG"),
    (0.25, "SOFR90DAYAVG"),
    (0.5, "SOFR180DAYAVG"),
    (1.0, "DGS1"),
    (2.0, "DGS2"),
    (3.0, "DGS3"),
    (5.0, "DGS5"),
    (7.0, "DGS7"),
    (10.0, "DGS10"),
    (20.0, "DGS20"),
    (30.0, "DGS30"),
];

const OIS_SERIES: &[(f64, &str)] = &[
    (1.0 / 12.0, "DGS1MO"),
    (0.25, "DGS3MO"),
    (0.5, "DGS6MO"),
    (1.0, "DGS1"),
    (2.0, "DGS2"),
    (3.0, "DGS3"),
    (5.0, "DGS5"),
    (7.0, "DGS7"),
    (10.0, "DGS10"),
    (20.0, "DGS20"),
    (30.0, "DGS30"),
];

/// A named zero-curve family.
///
/// Each family is assembled from a fixed table of `(tenor_years, series_id)`
/// pairs, one observation per series.
///
/// # Example
///
/// ```
/// use market_core::market_data::curves::CurveFamily;
///
/// let family: CurveFamily = "OIS".parse().unwrap();
/// assert_eq!(family, CurveFamily::Ois);
/// assert_eq!(family.series()[0].1, "DGS1MO");
/// assert!("LIBOR".parse::<CurveFamily>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurveFamily {
    /// Secured Overnight Financing Rate averages, Treasury constant maturities beyond one year
    #[default]
    Sofr,
    /// Overnight-indexed proxy from Treasury constant maturities
    Ois,
}

impl CurveFamily {
    /// Every supported family.
    pub const ALL: [CurveFamily; 2] = [CurveFamily::Sofr, CurveFamily::Ois];

    /// Canonical upper-case name, also used as the zero-point cache key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveFamily::Sofr => "SOFR",
            CurveFamily::Ois => "OIS",
        }
    }

    /// `(tenor_years, series_id)` pairs in ascending tenor order.
    pub fn series(&self) -> &'static [(f64, &'static str)] {
        match self {
            CurveFamily::Sofr => SOFR_SERIES,
            CurveFamily::Ois => OIS_SERIES,
        }
    }
}

impl fmt::Display for CurveFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveFamily {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOFR" => Ok(CurveFamily::Sofr),
            "OIS" => Ok(CurveFamily::Ois),
            other => Err(MarketDataError::UnknownParameter {
                kind: "curve family",
                value: other.to_string(),
            }),
        }
    }
}

/// Which view of a curve to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// Zero rates as observed
    #[default]
    Zero,
    /// Forward rates over a fixed period
    Forward,
}

impl CurveType {
    /// Lower-case name used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveType::Zero => "zero",
            CurveType::Forward => "forward",
        }
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveType {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(CurveType::Zero),
            "forward" => Ok(CurveType::Forward),
            other => Err(MarketDataError::UnknownParameter {
                kind: "curve type",
                value: other.to_string(),
            }),
        }
    }
}

/// Round a fixed period to 6 decimal places.
///
/// Requests that differ below a microyear share one cache entry.
///
/// ```
/// use market_core::market_data::curves::normalize_fixed_period;
///
/// assert_eq!(normalize_fixed_period(0.50000049), 0.5);
/// assert_eq!(normalize_fixed_period(0.2500006), 0.250001);
/// ```
pub fn normalize_fixed_period(years: f64) -> f64 {
    (years * 1e6).round() / 1e6
}
