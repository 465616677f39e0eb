//! Numerical building blocks.
//!
//! - [`interpolators`]: one-dimensional and scattered two-dimensional interpolation

pub mod interpolators;
