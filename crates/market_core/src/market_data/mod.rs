//! Derived market objects built from raw observations.
//!
//! # Components
//!
//! - [`curves`]: Zero-rate curves per curve family and forward-rate derivation
//! - [`surfaces`]: Implied-volatility quote filtering and grid construction
//! - [`history`]: Close-price series and range windows
//! - [`error`]: Market data error types (MarketDataError)
//!
//! Every builder here is synchronous and side-effect free. Observations come
//! in as plain values; derived objects go out as plain values.

pub mod curves;
pub mod error;
pub mod history;
pub mod surfaces;

pub use curves::{forward_curve, CurveFamily, CurvePoint, CurveType, ZeroCurve};
pub use error::MarketDataError;
pub use history::{HistoryPoint, HistoryRange, HistorySeries};
pub use surfaces::{IvQuote, IvSurfaceGrid, OptionContract, QuoteFilter, SurfaceBuilder, SurfaceSide};
