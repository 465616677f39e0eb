//! Market data error types.
//!
//! This module provides structured error handling for curve, surface and
//! history construction.

use crate::types::InterpolationError;
use thiserror::Error;

/// Market data operation errors.
///
/// # Variants
///
/// - `InsufficientData`: Fewer usable points than the object needs
/// - `NoUsableData`: Every raw record was filtered out
/// - `InvalidPeriod`: Forward period is not a positive finite number
/// - `DuplicateTenor`: Two curve points share a tenor
/// - `NonFiniteValue`: A curve point carries NaN or infinity
/// - `UnknownParameter`: A textual selector (curve, range, side) was not recognised
/// - `Interpolation`: Wrapped interpolation error
///
/// # Examples
///
/// ```
/// use market_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InsufficientData { got: 1, need: 2 };
/// assert_eq!(err.to_string(), "Insufficient data: got 1, need 2");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of usable points
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// No record survived filtering.
    #[error("No usable data")]
    NoUsableData,

    /// Invalid forward period.
    #[error("Invalid fixed period: {period}")]
    InvalidPeriod {
        /// The rejected period in years
        period: f64,
    },

    /// Duplicate tenor in a curve.
    #[error("Duplicate tenor: {tenor}")]
    DuplicateTenor {
        /// The repeated tenor
        tenor: f64,
    },

    /// NaN or infinite coordinate.
    #[error("Non-finite curve point at tenor {tenor}")]
    NonFiniteValue {
        /// Tenor of the offending point
        tenor: f64,
    },

    /// Unrecognised selector string.
    #[error("Unknown {kind}: {value}")]
    UnknownParameter {
        /// What was being parsed
        kind: &'static str,
        /// The rejected input
        value: String,
    },

    /// Interpolation error.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),
}
