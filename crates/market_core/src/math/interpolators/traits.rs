//! Shared interface for one-dimensional interpolators.

use num_traits::Float;

/// A one-dimensional interpolator defined on a finite set of knots.
///
/// Implementations decide how to behave outside `domain()`; the
/// interpolators in this crate extrapolate flat.
pub trait Interpolator<T: Float> {
    /// Evaluate the interpolant at `x`.
    fn interpolate(&self, x: T) -> T;

    /// Range spanned by the knots, `(x_min, x_max)`.
    fn domain(&self) -> (T, T);
}
