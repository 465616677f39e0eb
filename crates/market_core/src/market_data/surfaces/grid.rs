//! Scattered quotes to regular grid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::quotes::IvQuote;
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::{linspace, ScatteredLinearInterpolator};

/// Default number of nodes on each grid axis.
pub const DEFAULT_GRID_SIZE: usize = 20;

/// Quote side a surface was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceSide {
    /// Mid quotes
    #[default]
    Mid,
    /// Bid quotes
    Bid,
    /// Ask quotes
    Ask,
}

impl SurfaceSide {
    /// Lower-case name used in cache keys and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceSide::Mid => "mid",
            SurfaceSide::Bid => "bid",
            SurfaceSide::Ask => "ask",
        }
    }
}

impl fmt::Display for SurfaceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfaceSide {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mid" => Ok(SurfaceSide::Mid),
            "bid" => Ok(SurfaceSide::Bid),
            "ask" => Ok(SurfaceSide::Ask),
            other => Err(MarketDataError::UnknownParameter {
                kind: "surface side",
                value: other.to_string(),
            }),
        }
    }
}

/// Implied volatility on a regular strike × maturity grid.
///
/// `values[m][k]` is the volatility at `maturities[m]`, `strikes[k]`; `None`
/// marks a node outside the convex hull of the samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvSurfaceGrid {
    /// Strike axis, ascending
    pub strikes: Vec<f64>,
    /// Maturity axis in years, ascending
    pub maturities: Vec<f64>,
    /// Values indexed `[maturity][strike]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl IvSurfaceGrid {
    /// Value at maturity index `m` and strike index `k`.
    pub fn value(&self, m: usize, k: usize) -> Option<f64> {
        self.values.get(m)?.get(k).copied().flatten()
    }

    /// Number of nodes carrying a value.
    pub fn filled_count(&self) -> usize {
        self.values.iter().flatten().filter(|v| v.is_some()).count()
    }
}

/// Builds an [`IvSurfaceGrid`] from scattered samples.
///
/// Axes span the sample bounds with both ends included. Each node is
/// evaluated by linear interpolation on a Delaunay triangulation of the
/// `(strike, ttm)` sample locations.
///
/// # Example
///
/// ```
/// use market_core::market_data::surfaces::{IvQuote, SurfaceBuilder};
///
/// let q = |strike, ttm, implied_vol| IvQuote { strike, ttm, implied_vol, open_interest: 100 };
/// let quotes = [q(90.0, 0.1, 0.25), q(110.0, 0.1, 0.21), q(90.0, 0.5, 0.24), q(110.0, 0.5, 0.20)];
///
/// let grid = SurfaceBuilder::new(3, 2).build(&quotes).unwrap();
/// assert_eq!(grid.strikes, vec![90.0, 100.0, 110.0]);
/// assert_eq!(grid.maturities, vec![0.1, 0.5]);
/// assert!((grid.value(0, 1).unwrap() - 0.23).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceBuilder {
    /// Nodes on the strike axis
    pub num_strikes: usize,
    /// Nodes on the maturity axis
    pub num_maturities: usize,
}

impl Default for SurfaceBuilder {
    fn default() -> Self {
        Self {
            num_strikes: DEFAULT_GRID_SIZE,
            num_maturities: DEFAULT_GRID_SIZE,
        }
    }
}

impl SurfaceBuilder {
    /// Builder with custom axis lengths.
    pub fn new(num_strikes: usize, num_maturities: usize) -> Self {
        Self {
            num_strikes,
            num_maturities,
        }
    }

    /// Grid the samples.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::NoUsableData)` - `quotes` is empty
    /// * `Err(MarketDataError::Interpolation)` - Samples cannot be triangulated
    ///   (fewer than three distinct locations, or all on one line)
    pub fn build(&self, quotes: &[IvQuote]) -> Result<IvSurfaceGrid, MarketDataError> {
        if quotes.is_empty() {
            return Err(MarketDataError::NoUsableData);
        }

        let (mut k_min, mut k_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut t_min, mut t_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for q in quotes {
            k_min = k_min.min(q.strike);
            k_max = k_max.max(q.strike);
            t_min = t_min.min(q.ttm);
            t_max = t_max.max(q.ttm);
        }

        let locations: Vec<(f64, f64)> = quotes.iter().map(|q| (q.strike, q.ttm)).collect();
        let vols: Vec<f64> = quotes.iter().map(|q| q.implied_vol).collect();
        let interp = ScatteredLinearInterpolator::new(&locations, &vols)?;

        let strikes = linspace(k_min, k_max, self.num_strikes);
        let maturities = linspace(t_min, t_max, self.num_maturities);
        let values = maturities
            .iter()
            .map(|&t| strikes.iter().map(|&k| interp.interpolate(k, t)).collect())
            .collect();

        Ok(IvSurfaceGrid {
            strikes,
            maturities,
            values,
        })
    }
}
