//! # market_core: Derivation and Caching Layer for Market Data
//!
//! ## Layer Role
//!
//! market_core is the bottom layer of the market-data service. It turns raw
//! third-party observations into derived market objects and keeps them in
//! bounded, time-limited caches:
//! - Time-bounded LRU cache (`cache`)
//! - Piecewise-linear and scattered-data interpolation (`math::interpolators`)
//! - Zero/forward curve bootstrapping (`market_data::curves`)
//! - Implied-volatility quote filtering and surface gridding (`market_data::surfaces`)
//! - Price-history windows (`market_data::history`)
//! - Error types: `InterpolationError` (`types::error`), `MarketDataError` (`market_data::error`)
//!
//! ## No I/O Principle
//!
//! Every builder in this crate is a pure, synchronous computation. Fetching
//! observations from external services is the job of the caller; the
//! results are handed to the builders here and run to completion.
//!
//! ## Usage Examples
//!
//! ```rust
//! use market_core::market_data::curves::{forward_curve, CurvePoint, ZeroCurve};
//!
//! let zero = ZeroCurve::new(vec![
//!     CurvePoint::new(1.0, 0.02),
//!     CurvePoint::new(2.0, 0.025),
//!     CurvePoint::new(3.0, 0.03),
//! ])
//! .unwrap();
//!
//! let forwards = forward_curve(&zero, 1.0).unwrap();
//! // forward over [1, 2] = (0.025 * 2 - 0.02 * 1) / 1
//! assert!((forwards[0].y - 0.03).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod cache;
pub mod market_data;
pub mod math;
pub mod types;
