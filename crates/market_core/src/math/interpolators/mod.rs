//! Interpolation methods for curve and surface construction.
//!
//! ## Available Interpolators
//!
//! - [`LinearInterpolator`]: Piecewise linear interpolation with flat extrapolation
//! - [`ScatteredLinearInterpolator`]: Linear interpolation over a Delaunay
//!   triangulation of scattered `(x, y)` samples
//!
//! ## Core Trait
//!
//! One-dimensional interpolators implement [`Interpolator`], which defines:
//! - `interpolate(x: T) -> T`: Compute interpolated value
//! - `domain() -> (T, T)`: Range spanned by the knots
//!
//! ## Example
//!
//! ```
//! use market_core::math::interpolators::{linspace, Interpolator, LinearInterpolator};
//!
//! let interp = LinearInterpolator::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
//! let ys: Vec<f64> = linspace(0.0, 2.0, 5).into_iter().map(|x| interp.interpolate(x)).collect();
//! assert_eq!(ys, vec![0.0, 0.5, 1.0, 2.5, 4.0]);
//! ```

mod linear;
mod scattered;
mod traits;

pub use linear::LinearInterpolator;
pub use scattered::ScatteredLinearInterpolator;
pub use traits::Interpolator;

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// The final element is exactly `end`. `n == 1` yields `[start]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = end;
            out
        }
    }
}
