//! Linear interpolation implementation.

use super::Interpolator;
use crate::types::InterpolationError;
use num_traits::Float;

/// Piecewise linear interpolator with flat extrapolation.
///
/// Stores sorted (x, y) data points and performs linear interpolation
/// between adjacent points. Outside the knot range the first or last
/// y-value is returned unchanged; no slope is applied beyond the ends.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`, `f32`)
///
/// # Construction
///
/// Data points are sorted by x-coordinate during construction, so callers
/// that cannot guarantee ordering still get a well-formed curve. A single
/// point is accepted and yields a constant function.
///
/// # Example
///
/// ```
/// use market_core::math::interpolators::{Interpolator, LinearInterpolator};
///
/// let interp: LinearInterpolator<f64> = LinearInterpolator::new(&[1.0, 2.0, 3.0], &[0.02, 0.025, 0.03]).unwrap();
/// assert_eq!(interp.interpolate(0.5), 0.02);
/// assert_eq!(interp.interpolate(10.0), 0.03);
/// assert!((interp.interpolate(1.5) - 0.0225).abs() < 1e-15);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator<T: Float> {
    /// Sorted x-coordinates
    xs: Vec<T>,
    /// Corresponding y-values (in same order as xs after sorting)
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Construct a linear interpolator from x and y data points.
    ///
    /// # Returns
    ///
    /// * `Ok(LinearInterpolator)` - Successfully constructed interpolator
    /// * `Err(InterpolationError::EmptyInput)` - No data points
    /// * `Err(InterpolationError::InvalidInput)` - Mismatched array lengths
    ///
    /// # Example
    ///
    /// ```
    /// use market_core::math::interpolators::LinearInterpolator;
    /// use market_core::types::InterpolationError;
    ///
    /// let empty: [f64; 0] = [];
    /// let result = LinearInterpolator::new(&empty, &empty);
    /// assert_eq!(result.unwrap_err(), InterpolationError::EmptyInput);
    /// ```
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "xs and ys must have same length: got {} and {}",
                xs.len(),
                ys.len()
            )));
        }

        if xs.is_empty() {
            return Err(InterpolationError::EmptyInput);
        }

        // Stable sort keeps the caller's order among equal abscissae
        let mut pairs: Vec<(T, T)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let (sorted_xs, sorted_ys): (Vec<T>, Vec<T>) = pairs.into_iter().unzip();

        Ok(Self {
            xs: sorted_xs,
            ys: sorted_ys,
        })
    }

    /// Returns a reference to the sorted x-coordinates.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Returns a reference to the y-values (in sorted x order).
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// Returns the number of data points.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Returns true if the interpolator has no data points.
    /// Note: This is never true for a constructed interpolator.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Index `i` such that `xs[i] <= x < xs[i+1]`.
    ///
    /// Only called for `xs[0] < x < xs[n-1]`.
    #[inline]
    fn find_segment(&self, x: T) -> usize {
        let pos = self.xs.partition_point(|&xi| xi <= x);
        pos.saturating_sub(1).min(self.xs.len() - 2)
    }
}

impl<T: Float> Interpolator<T> for LinearInterpolator<T> {
    /// Interpolate value at point `x`.
    ///
    /// # Formula
    ///
    /// ```text
    /// x <= x_0        -> y_0
    /// x >= x_{n-1}    -> y_{n-1}
    /// otherwise       -> y0 + (x - x0) / (x1 - x0) * (y1 - y0)
    /// ```
    fn interpolate(&self, x: T) -> T {
        let last = self.xs.len() - 1;
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[last] {
            return self.ys[last];
        }

        let i = self.find_segment(x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);

        if x1 == x0 {
            return y0;
        }
        let w = (x - x0) / (x1 - x0);
        y0 + w * (y1 - y0)
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
