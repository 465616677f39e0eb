//! Implied-volatility surfaces.
//!
//! This module provides:
//! - [`OptionContract`]: A raw call-side option row as delivered by a chain feed
//! - [`QuoteFilter`]: Turns raw rows into clean [`IvQuote`] samples
//! - [`SurfaceBuilder`]: Grids scattered samples into an [`IvSurfaceGrid`]
//! - [`SurfaceSide`]: Quote side selector carried alongside a surface

mod grid;
mod quotes;

pub use grid::{IvSurfaceGrid, SurfaceBuilder, SurfaceSide, DEFAULT_GRID_SIZE};
pub use quotes::{expiration_ttm, IvQuote, OptionContract, QuoteFilter, DEFAULT_MIN_OPEN_INTEREST};
