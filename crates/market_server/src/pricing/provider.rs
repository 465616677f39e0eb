//! Pricing provider implementations

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{PricingError, PricingProvider, PricingRequest, PricingResponse};
use crate::error::truncate_chars;

/// Forwards requests to a pricing engine over HTTP
///
/// Each instrument is posted as JSON to `{base_url}{path}`, e.g.
/// `http://engine:9000/price/option/vanilla`.
#[derive(Debug, Clone)]
pub struct HttpPricingProvider {
    client: Client,
    base_url: String,
}

impl HttpPricingProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PricingProvider for HttpPricingProvider {
    async fn price(&self, request: &PricingRequest) -> Result<PricingResponse, PricingError> {
        let url = format!("{}{}", self.base_url, request.path());
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PricingError::Engine("engine request timed out".to_string())
                } else {
                    PricingError::EngineUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(PricingError::Invalid(format!(
                "Pricing engine rejected the request: {}",
                truncate_chars(&body, 200)
            )));
        }
        if !status.is_success() {
            return Err(PricingError::Engine(format!("HTTP {}", status.as_u16())));
        }

        response
            .json::<PricingResponse>()
            .await
            .map_err(|e| PricingError::Engine(e.to_string()))
    }
}

/// Provider used when no engine is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPricingProvider;

#[async_trait]
impl PricingProvider for DisabledPricingProvider {
    async fn price(&self, _request: &PricingRequest) -> Result<PricingResponse, PricingError> {
        Err(PricingError::EngineUnavailable(
            "no pricing engine is configured".to_string(),
        ))
    }
}
