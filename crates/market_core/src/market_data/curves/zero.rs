//! Zero-rate curves.

use serde::{Deserialize, Serialize};

use crate::market_data::error::MarketDataError;
use crate::math::interpolators::{Interpolator, LinearInterpolator};
use crate::types::InterpolationError;

/// Minimum number of points for a usable zero or forward curve.
pub const MIN_CURVE_POINTS: usize = 2;

/// A single `(tenor, rate)` point, tenor in years.
///
/// Serialised as `{"x": tenor, "y": rate}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Tenor in years
    pub x: f64,
    /// Rate at that tenor
    pub y: f64,
}

impl CurvePoint {
    /// Create a point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Latest observation of one rate series, or `None` when the series had no
/// usable value.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesObservation {
    /// Tenor the series represents
    pub tenor: f64,
    /// Series identifier, e.g. `"DGS10"`
    pub series_id: String,
    /// Latest numeric value
    pub value: Option<f64>,
}

/// Zero rates ordered by ascending, distinct tenor.
///
/// A zero curve may hold fewer than [`MIN_CURVE_POINTS`] points; callers
/// check [`ZeroCurve::ensure_usable`] before publishing it.
///
/// # Example
///
/// ```
/// use market_core::market_data::curves::{CurvePoint, ZeroCurve};
///
/// let curve = ZeroCurve::new(vec![
///     CurvePoint::new(2.0, 0.025),
///     CurvePoint::new(1.0, 0.02),
/// ])
/// .unwrap();
///
/// assert_eq!(curve.points()[0].x, 1.0);
/// assert!((curve.interpolate(1.5).unwrap() - 0.0225).abs() < 1e-15);
/// assert_eq!(curve.interpolate(40.0).unwrap(), 0.025);
/// ```
#[derive(Debug, Clone)]
pub struct ZeroCurve {
    points: Vec<CurvePoint>,
    interp: Option<LinearInterpolator<f64>>,
}

impl ZeroCurve {
    /// Build a curve from points in any order.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::NonFiniteValue)` - A tenor or rate is NaN or infinite
    /// * `Err(MarketDataError::DuplicateTenor)` - Two points share a tenor
    pub fn new(mut points: Vec<CurvePoint>) -> Result<Self, MarketDataError> {
        if let Some(bad) = points
            .iter()
            .find(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(MarketDataError::NonFiniteValue { tenor: bad.x });
        }

        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        if let Some(w) = points.windows(2).find(|w| w[0].x == w[1].x) {
            return Err(MarketDataError::DuplicateTenor { tenor: w[0].x });
        }

        let interp = if points.is_empty() {
            None
        } else {
            let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
            let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
            Some(LinearInterpolator::new(&xs, &ys)?)
        };

        Ok(Self { points, interp })
    }

    /// Assemble a curve from per-series observations.
    ///
    /// Series without a value are left out of the curve and their ids
    /// returned, in input order, as the second element.
    pub fn from_observations<I>(observations: I) -> Result<(Self, Vec<String>), MarketDataError>
    where
        I: IntoIterator<Item = SeriesObservation>,
    {
        let mut points = Vec::new();
        let mut missing = Vec::new();
        for obs in observations {
            match obs.value {
                Some(rate) if rate.is_finite() => points.push(CurvePoint::new(obs.tenor, rate)),
                _ => missing.push(obs.series_id),
            }
        }
        Ok((Self::new(points)?, missing))
    }

    /// Points in ascending tenor order.
    #[inline]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Consume the curve, returning its points.
    pub fn into_points(self) -> Vec<CurvePoint> {
        self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the curve has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fail with `InsufficientData` unless the curve has at least
    /// [`MIN_CURVE_POINTS`] points.
    pub fn ensure_usable(&self) -> Result<(), MarketDataError> {
        if self.points.len() < MIN_CURVE_POINTS {
            return Err(MarketDataError::InsufficientData {
                got: self.points.len(),
                need: MIN_CURVE_POINTS,
            });
        }
        Ok(())
    }

    /// Zero rate at `tenor`, flat beyond the first and last points.
    pub fn interpolate(&self, tenor: f64) -> Result<f64, MarketDataError> {
        self.interp
            .as_ref()
            .map(|i| i.interpolate(tenor))
            .ok_or(MarketDataError::Interpolation(InterpolationError::EmptyInput))
    }
}

/// Evaluate a piecewise-linear curve through `points` at `x`.
///
/// `points` need not be sorted. Below the first tenor the first rate is
/// returned, above the last tenor the last rate.
///
/// ```
/// use market_core::market_data::curves::{interpolate_linear, CurvePoint};
///
/// let pts = [CurvePoint::new(3.0, 0.03), CurvePoint::new(1.0, 0.01)];
/// assert!((interpolate_linear(&pts, 2.0).unwrap() - 0.02).abs() < 1e-15);
/// assert!(interpolate_linear(&[], 2.0).is_err());
/// ```
pub fn interpolate_linear(points: &[CurvePoint], x: f64) -> Result<f64, InterpolationError> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let interp = LinearInterpolator::new(&xs, &ys)?;
    Ok(interp.interpolate(x))
}
