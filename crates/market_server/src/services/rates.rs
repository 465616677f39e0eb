use std::sync::Arc;

use market_core::cache::TtlCache;
use market_core::market_data::curves::{
    normalize_fixed_period, SeriesObservation, MIN_CURVE_POINTS,
};
use market_core::market_data::{forward_curve, CurveFamily, CurvePoint, CurveType, MarketDataError, ZeroCurve};
use serde::{Deserialize, Serialize};

use super::{CachePolicy, Cached, SharedClock};
use crate::error::{truncate_chars, ServiceError, MAX_DIAGNOSTIC_CHARS};
use crate::feeds::{FeedError, RateObservationService};

/// Limit for per-series failure diagnostics.
const SERIES_ERROR_CHARS: usize = 120;

const FORWARD_INSUFFICIENT: &str =
    "Insufficient data to compute forward curve with the selected fixed period";

/// A published rate curve
///
/// `zero` holds zero rates or forward rates depending on the requested
/// curve type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurveResponse {
    pub curve: CurveFamily,
    pub zero: Vec<CurvePoint>,
}

/// Builds zero and forward curves from latest series observations
///
/// Two caches cooperate: zero points per curve family, and finished curves
/// per `(family, type, period)`. A forward request for a new period reuses
/// the family's cached zero points.
pub struct RateCurveOrchestrator {
    rates: Arc<dyn RateObservationService>,
    curves: TtlCache<String, Arc<RateCurveResponse>, SharedClock>,
    zero_points: TtlCache<String, Arc<ZeroCurve>, SharedClock>,
}

impl RateCurveOrchestrator {
    pub fn new(rates: Arc<dyn RateObservationService>, clock: SharedClock) -> Self {
        Self {
            rates,
            curves: CachePolicy::RATE_CURVE.build(clock.clone()),
            zero_points: CachePolicy::ZERO_POINTS.build(clock),
        }
    }

    pub async fn curve(
        &self,
        family: CurveFamily,
        curve_type: CurveType,
        fixed_period_years: f64,
    ) -> Result<Cached<Arc<RateCurveResponse>>, ServiceError> {
        let period = normalize_fixed_period(fixed_period_years);
        let key = format!("{family}:{curve_type}:{period}");

        if let Some(cached) = self.curves.get(&key) {
            tracing::info!(
                curve = %family,
                curve_type = %curve_type,
                points = cached.zero.len(),
                "rates_curve cache_hit"
            );
            return Ok(Cached::hit(cached));
        }

        let (zero, missing, zero_hit) = match self.zero_points.get(family.as_str()) {
            Some(zero) => {
                tracing::info!(
                    curve = %family,
                    points = zero.len(),
                    "rates_curve zero_points_cache_hit"
                );
                (zero, Vec::new(), true)
            }
            None => {
                let (zero, missing) = self.fetch_zero_curve(family).await?;
                let zero = Arc::new(zero);
                self.zero_points.set(family.as_str().to_string(), zero.clone());
                (zero, missing, false)
            }
        };

        if zero.len() < MIN_CURVE_POINTS {
            return Err(ServiceError::Insufficient(format!(
                "Insufficient FRED data for {family} curve"
            )));
        }

        let output = match curve_type {
            CurveType::Zero => zero.points().to_vec(),
            CurveType::Forward => forward_curve(&zero, period).map_err(|e| match e {
                MarketDataError::InsufficientData { .. } | MarketDataError::InvalidPeriod { .. } => {
                    ServiceError::Insufficient(FORWARD_INSUFFICIENT.to_string())
                }
                other => {
                    tracing::error!(
                        curve = %family,
                        error = %truncate_chars(&other.to_string(), MAX_DIAGNOSTIC_CHARS),
                        "rates_curve failed"
                    );
                    ServiceError::Unexpected("Failed to build rate curve".to_string())
                }
            })?,
        };

        let response = Arc::new(RateCurveResponse {
            curve: family,
            zero: output,
        });
        self.curves.set(key, response.clone());

        tracing::info!(
            curve = %family,
            curve_type = %curve_type,
            fixed_period_years = period,
            zero_points = zero.len(),
            output_points = response.zero.len(),
            missing_series = ?missing,
            "rates_curve cache_miss"
        );

        Ok(Cached {
            value: response,
            cache_hit: zero_hit,
        })
    }

    /// Latest observation of every series of `family`.
    ///
    /// A failing series is logged and reported missing; only a missing
    /// API key aborts the fetch.
    async fn fetch_zero_curve(
        &self,
        family: CurveFamily,
    ) -> Result<(ZeroCurve, Vec<String>), ServiceError> {
        let mut observations = Vec::with_capacity(family.series().len());
        for &(tenor, series_id) in family.series() {
            let value = match self.rates.latest_observation(series_id).await {
                Ok(value) => value,
                Err(FeedError::NotConfigured(detail)) => {
                    tracing::error!(curve = %family, "rates_curve not_configured");
                    return Err(ServiceError::Unexpected(detail));
                }
                Err(e) => {
                    tracing::warn!(
                        curve = %family,
                        series = series_id,
                        error = %truncate_chars(&e.to_string(), SERIES_ERROR_CHARS),
                        "rates_curve series_fetch_failed"
                    );
                    None
                }
            };
            observations.push(SeriesObservation {
                tenor,
                series_id: series_id.to_string(),
                value,
            });
        }

        ZeroCurve::from_observations(observations).map_err(|e| {
            tracing::error!(
                curve = %family,
                error = %truncate_chars(&e.to_string(), MAX_DIAGNOSTIC_CHARS),
                "rates_curve failed"
            );
            ServiceError::Unexpected("Failed to build rate curve".to_string())
        })
    }
}
