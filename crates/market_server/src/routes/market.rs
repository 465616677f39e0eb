//! Market-data endpoints
//!
//! Every handler tags its response with a [`CacheStatus`] extension so the
//! request logger can report cache hits.

use std::str::FromStr;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use market_core::market_data::curves::normalize_fixed_period;
use market_core::market_data::{CurveFamily, CurveType, HistoryRange, SurfaceSide};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CacheStatus;

/// Longest accepted forward period in years.
pub const MAX_FIXED_PERIOD_YEARS: f64 = 10.0;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub ticker: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CurveQuery {
    pub curve: Option<String>,
    pub curve_type: Option<String>,
    pub fixed_period_years: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SurfaceQuery {
    pub ticker: Option<String>,
    pub surface: Option<String>,
}

/// Build the market routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/market/tickers", get(tickers_handler))
        .route("/market/prices/history", get(history_handler))
        .route("/market/rates/curve", get(rates_curve_handler))
        .route("/market/iv/surface", get(iv_surface_handler))
}

fn tagged<T: Serialize>(value: &T, cache_hit: bool) -> Response {
    let mut response = Json(value).into_response();
    response.extensions_mut().insert(CacheStatus(cache_hit));
    response
}

fn required_ticker(ticker: Option<String>) -> ApiResult<String> {
    ticker
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("ticker is required".to_string()))
}

/// Parse an optional enum parameter, falling back to its default.
fn parse_or_default<T>(raw: Option<String>) -> ApiResult<T>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(T::default()),
        Some(s) => s.parse().map_err(|e: T::Err| ApiError::BadRequest(e.to_string())),
    }
}

fn parse_fixed_period(raw: Option<String>) -> ApiResult<f64> {
    let Some(raw) = raw else {
        return Ok(0.5);
    };
    let years: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("fixed_period_years is not a number: {raw}")))?;
    // Periods below a microyear round to zero in the cache key
    if !years.is_finite() || normalize_fixed_period(years) <= 0.0 || years > MAX_FIXED_PERIOD_YEARS {
        return Err(ApiError::BadRequest(format!(
            "fixed_period_years must be in (0, {MAX_FIXED_PERIOD_YEARS}]"
        )));
    }
    Ok(years)
}

/// GET /market/tickers
async fn tickers_handler(State(state): State<AppState>) -> ApiResult<Response> {
    let result = state.market.tickers().await?;
    Ok(tagged(result.value.as_ref(), result.cache_hit))
}

/// GET /market/prices/history?ticker=AAPL&range=6M
async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Response> {
    let ticker = required_ticker(query.ticker)?;
    let range: HistoryRange = parse_or_default(query.range)?;

    let result = state.market.history(&ticker, range).await?;
    Ok(tagged(&result.value, result.cache_hit))
}

/// GET /market/rates/curve?curve=SOFR&curve_type=forward&fixed_period_years=0.5
async fn rates_curve_handler(
    State(state): State<AppState>,
    Query(query): Query<CurveQuery>,
) -> ApiResult<Response> {
    let family: CurveFamily = parse_or_default(query.curve)?;
    let curve_type: CurveType = parse_or_default(query.curve_type)?;
    let period = parse_fixed_period(query.fixed_period_years)?;

    let result = state.market.rate_curve(family, curve_type, period).await?;
    Ok(tagged(result.value.as_ref(), result.cache_hit))
}

/// GET /market/iv/surface?ticker=SPY&surface=mid
async fn iv_surface_handler(
    State(state): State<AppState>,
    Query(query): Query<SurfaceQuery>,
) -> ApiResult<Response> {
    let ticker = required_ticker(query.ticker)?;
    let side: SurfaceSide = parse_or_default(query.surface)?;

    let result = state.market.iv_surface(&ticker, side).await?;
    Ok(tagged(result.value.as_ref(), result.cache_hit))
}
