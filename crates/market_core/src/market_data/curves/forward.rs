//! Forward rates from a zero curve.
//!
//! For a start tenor `t` and period `p`:
//!
//! ```text
//! f(t, p) = (z(t + p) * (t + p) - z(t) * t) / p
//! ```
//!
//! with `z` the flat-extrapolated linear zero curve.

use super::zero::{CurvePoint, ZeroCurve, MIN_CURVE_POINTS};
use crate::market_data::error::MarketDataError;

/// Two start tenors closer than this are the same tenor.
pub const FORWARD_TENOR_TOLERANCE: f64 = 1e-10;

/// Raw forward points for `fixed_period` years.
///
/// Start tenors are every zero tenor no later than `cutoff = last_tenor -
/// fixed_period`, plus `cutoff` itself. If `cutoff` does not lie beyond the
/// first tenor there is no forward window and the result is empty. Points
/// whose forward rate is not finite are left out.
///
/// The first zero tenor is always a start tenor when a window exists, even
/// if the window ending there is very short.
pub fn forward_points(zero: &ZeroCurve, fixed_period: f64) -> Vec<CurvePoint> {
    let points = zero.points();
    if points.len() < MIN_CURVE_POINTS || fixed_period.is_nan() || fixed_period <= 0.0 {
        return Vec::new();
    }

    let first = points[0].x;
    let cutoff = points[points.len() - 1].x - fixed_period;
    if cutoff <= first {
        return Vec::new();
    }

    let mut starts: Vec<f64> = points.iter().map(|p| p.x).filter(|&t| t <= cutoff).collect();
    if !starts
        .iter()
        .any(|t| (t - cutoff).abs() < FORWARD_TENOR_TOLERANCE)
    {
        starts.push(cutoff);
    }
    starts.sort_by(f64::total_cmp);
    starts.dedup();

    starts
        .into_iter()
        .filter_map(|t_start| {
            let t_end = t_start + fixed_period;
            let z_start = zero.interpolate(t_start).ok()?;
            let z_end = zero.interpolate(t_end).ok()?;
            let fwd = (z_end * t_end - z_start * t_start) / fixed_period;
            fwd.is_finite().then_some(CurvePoint::new(t_start, fwd))
        })
        .collect()
}

/// Forward curve for `fixed_period` years, failing when it has fewer than
/// two points.
///
/// # Returns
///
/// * `Err(MarketDataError::InvalidPeriod)` - `fixed_period` is not positive and finite
/// * `Err(MarketDataError::InsufficientData)` - Fewer than two forward points
///
/// # Example
///
/// ```
/// use market_core::market_data::curves::{forward_curve, CurvePoint, ZeroCurve};
///
/// let zero = ZeroCurve::new(vec![
///     CurvePoint::new(1.0, 0.02),
///     CurvePoint::new(2.0, 0.025),
///     CurvePoint::new(3.0, 0.03),
/// ])
/// .unwrap();
///
/// let fwd = forward_curve(&zero, 1.0).unwrap();
/// assert_eq!(fwd.len(), 2);
/// assert!((fwd[1].y - 0.04).abs() < 1e-12);
/// ```
pub fn forward_curve(zero: &ZeroCurve, fixed_period: f64) -> Result<Vec<CurvePoint>, MarketDataError> {
    if !fixed_period.is_finite() || fixed_period <= 0.0 {
        return Err(MarketDataError::InvalidPeriod {
            period: fixed_period,
        });
    }

    let forwards = forward_points(zero, fixed_period);
    if forwards.len() < MIN_CURVE_POINTS {
        return Err(MarketDataError::InsufficientData {
            got: forwards.len(),
            need: MIN_CURVE_POINTS,
        });
    }
    Ok(forwards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve(points: &[(f64, f64)]) -> ZeroCurve {
        ZeroCurve::new(points.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect()).unwrap()
    }

    #[test]
    fn test_forward_identity_on_tenor_grid() {
        let zero = curve(&[(1.0, 0.02), (2.0, 0.025), (3.0, 0.03)]);
        let fwd = forward_curve(&zero, 1.0).unwrap();

        assert_eq!(fwd.len(), 2);
        assert_eq!(fwd[0].x, 1.0);
        assert_relative_eq!(fwd[0].y, (0.025 * 2.0 - 0.02 * 1.0) / 1.0, epsilon = 1e-15);
        assert_eq!(fwd[1].x, 2.0);
        assert_relative_eq!(fwd[1].y, (0.03 * 3.0 - 0.025 * 2.0) / 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_cutoff_is_added_as_start_tenor() {
        let zero = curve(&[(1.0, 0.02), (2.0, 0.025), (3.0, 0.03)]);
        let fwd = forward_curve(&zero, 0.5).unwrap();

        let starts: Vec<f64> = fwd.iter().map(|p| p.x).collect();
        assert_eq!(starts, vec![1.0, 2.0, 2.5]);

        // [2.5, 3.0]: z(2.5) = 0.0275, z(3) = 0.03
        assert_relative_eq!(fwd[2].y, (0.03 * 3.0 - 0.0275 * 2.5) / 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cutoff_within_tolerance_is_not_duplicated() {
        let zero = curve(&[(1.0, 0.02), (2.0, 0.025), (3.0, 0.03)]);
        let fwd = forward_points(&zero, 1.0 - 1e-12);
        let starts: Vec<f64> = fwd.iter().map(|p| p.x).collect();
        assert_eq!(starts, vec![1.0, 2.0]);
    }

    #[test]
    fn test_start_tenors_cross_short_end() {
        // 1/360 and 1/12 are both start tenors for a 0.5y period
        let zero = curve(&[
            (1.0 / 360.0, 0.0531),
            (1.0 / 12.0, 0.0533),
            (0.25, 0.0529),
            (0.5, 0.0519),
            (1.0, 0.0495),
        ]);
        let fwd = forward_curve(&zero, 0.5).unwrap();
        let starts: Vec<f64> = fwd.iter().map(|p| p.x).collect();
        assert_eq!(starts, vec![1.0 / 360.0, 1.0 / 12.0, 0.25, 0.5]);
    }

    #[test]
    fn test_period_spanning_whole_curve_is_empty() {
        let zero = curve(&[(1.0, 0.02), (2.0, 0.025), (3.0, 0.03)]);
        assert!(forward_points(&zero, 2.0).is_empty());
        assert!(forward_points(&zero, 5.0).is_empty());
        assert_eq!(
            forward_curve(&zero, 2.0).unwrap_err(),
            MarketDataError::InsufficientData { got: 0, need: 2 }
        );
    }

    #[test]
    fn test_single_point_zero_curve_is_insufficient() {
        let zero = curve(&[(1.0, 0.02)]);
        assert!(forward_points(&zero, 0.5).is_empty());
        assert!(matches!(
            forward_curve(&zero, 0.5).unwrap_err(),
            MarketDataError::InsufficientData { got: 0, need: 2 }
        ));
    }

    #[test]
    fn test_invalid_period() {
        let zero = curve(&[(1.0, 0.02), (2.0, 0.025), (3.0, 0.03)]);
        assert!(matches!(
            forward_curve(&zero, 0.0).unwrap_err(),
            MarketDataError::InvalidPeriod { .. }
        ));
        assert!(matches!(
            forward_curve(&zero, f64::NAN).unwrap_err(),
            MarketDataError::InvalidPeriod { .. }
        ));
    }

    #[test]
    fn test_first_tenor_kept_even_when_window_is_nearly_degenerate() {
        // cutoff lands a hair past the first tenor; the first tenor and the
        // cutoff both become start tenors only 1e-6 apart
        let zero = curve(&[(1.0, 0.02), (2.0, 0.03)]);
        let fwd = forward_points(&zero, 1.0 - 1e-6);

        assert_eq!(fwd.len(), 2);
        assert_eq!(fwd[0].x, 1.0);
        assert_relative_eq!(fwd[1].x, 1.0 + 1e-6, epsilon = 1e-12);
        assert_relative_eq!(fwd[0].y, fwd[1].y, epsilon = 1e-4);
    }

    #[test]
    fn test_flat_curve_forwards_equal_zero_rate() {
        let zero = curve(&[(0.5, 0.04), (1.0, 0.04), (5.0, 0.04), (10.0, 0.04)]);
        for p in forward_curve(&zero, 2.0).unwrap() {
            assert_relative_eq!(p.y, 0.04, epsilon = 1e-12);
        }
    }
}
