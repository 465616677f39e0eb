//! Interest-rate curves.
//!
//! This module provides:
//! - [`CurvePoint`]: A `(tenor, rate)` pair
//! - [`ZeroCurve`]: Zero rates ordered by tenor with flat-extrapolated linear lookup
//! - [`CurveFamily`]: Named curve families and the rate series that make them up
//! - [`CurveType`]: Zero or forward view of a curve
//! - [`forward_curve`]: Forward rates over a fixed period derived from a zero curve

mod family;
mod forward;
mod zero;

pub use family::{normalize_fixed_period, CurveFamily, CurveType};
pub use forward::{forward_curve, forward_points, FORWARD_TENOR_TOLERANCE};
pub use zero::{interpolate_linear, CurvePoint, SeriesObservation, ZeroCurve, MIN_CURVE_POINTS};
