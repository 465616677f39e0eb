//! Pricing boundary
//!
//! Pricing is delegated to an external engine behind [`PricingProvider`].
//! [`PricingService`] validates requests, bounds every call with a timeout
//! and logs request and result summaries.

mod provider;
mod requests;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{truncate_chars, ApiError, ServiceError, MAX_DIAGNOSTIC_CHARS};

pub use provider::{DisabledPricingProvider, HttpPricingProvider};
pub use requests::{
    AmericanEngineType, AmericanVanillaRequest, AsianAverageType, AsianRequest, EngineType,
    FixedRateBondRequest, FutureRequest, Greeks, PricingRequest, PricingResponse, VanillaRequest,
    ZeroCouponBondRequest, MIN_GRID_STEPS,
};

/// Default bound on one pricing call.
pub const DEFAULT_PRICING_TIMEOUT: Duration = Duration::from_secs(20);

/// Pricing failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("{0}")]
    Invalid(String),

    #[error("Pricing timed out after {secs} seconds. Reduce paths or grid steps and retry.")]
    Timeout { secs: u64 },

    #[error("Pricing engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Pricing engine error: {0}")]
    Engine(String),
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Invalid(msg) => ApiError::BadRequest(msg),
            PricingError::Timeout { .. } => ApiError::Timeout(err.to_string()),
            PricingError::EngineUnavailable(_) => {
                ApiError::Service(ServiceError::Unavailable("Pricing engine unavailable".to_string()))
            }
            PricingError::Engine(_) => {
                ApiError::Service(ServiceError::Unexpected("Pricing failed".to_string()))
            }
        }
    }
}

/// Opaque pricing engine
#[async_trait]
pub trait PricingProvider: Send + Sync {
    /// Price one instrument.
    async fn price(&self, request: &PricingRequest) -> Result<PricingResponse, PricingError>;
}

/// Validates, times out and logs calls to a [`PricingProvider`]
#[derive(Clone)]
pub struct PricingService {
    provider: Arc<dyn PricingProvider>,
    timeout: Duration,
}

impl PricingService {
    pub fn new(provider: Arc<dyn PricingProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn price(&self, request: PricingRequest) -> Result<PricingResponse, PricingError> {
        request.validate()?;

        let operation = request.operation();
        tracing::info!(operation, request = ?request, "pricing request");

        let response = match tokio::time::timeout(self.timeout, self.provider.price(&request)).await {
            Ok(result) => result,
            Err(_) => Err(PricingError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
        .map_err(|e| {
            tracing::error!(
                operation,
                error = %truncate_chars(&e.to_string(), MAX_DIAGNOSTIC_CHARS),
                "pricing failed"
            );
            e
        })?;

        tracing::info!(
            operation,
            npv = response.npv,
            mc_std_error = response.mc_std_error,
            diagnostics = %response.diagnostics,
            delta = ?response.greeks.delta,
            gamma = ?response.greeks.gamma,
            vega = ?response.greeks.vega,
            theta = ?response.greeks.theta,
            rho = ?response.greeks.rho,
            "pricing response"
        );
        Ok(response)
    }
}
