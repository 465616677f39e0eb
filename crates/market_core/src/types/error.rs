//! Error types for structured error handling.
//!
//! This module provides:
//! - `InterpolationError`: Errors from interpolation operations

use thiserror::Error;

/// Interpolation-related errors.
///
/// Provides structured error handling for interpolation operations
/// with descriptive context for each failure mode.
///
/// # Variants
/// - `EmptyInput`: No points to interpolate
/// - `InsufficientData`: Not enough data points for the chosen method
/// - `NonMonotonicData`: Abscissae are not strictly increasing
/// - `DegenerateGeometry`: Scattered samples do not span an area
/// - `InvalidInput`: General invalid input error
///
/// # Examples
/// ```
/// use market_core::types::InterpolationError;
///
/// let err = InterpolationError::EmptyInput;
/// assert_eq!(format!("{}", err), "No points to interpolate");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    /// No data points were supplied.
    #[error("No points to interpolate")]
    EmptyInput,

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Data is not strictly increasing when it is required to be.
    #[error("Data is not strictly increasing at index {index}")]
    NonMonotonicData {
        /// Index where the violation was detected
        index: usize,
    },

    /// Scattered sample locations cannot be triangulated.
    #[error("Degenerate sample geometry: {0}")]
    DegenerateGeometry(String),

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
