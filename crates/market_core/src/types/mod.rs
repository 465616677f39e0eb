//! Core time and error types.
//!
//! This module provides:
//! - `time`: Year-fraction helpers for option expiries and calendar windows
//! - `error`: Structured error types for interpolation operations
//!
//! # Re-exports
//!
//! - [`InterpolationError`] from `error`
//! - [`time_to_maturity`] from `time`

pub mod error;
pub mod time;

pub use error::InterpolationError;
pub use time::time_to_maturity;
