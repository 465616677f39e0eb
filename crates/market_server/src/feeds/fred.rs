//! FRED series observations client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{FeedError, RateObservationService};

/// Number of observations requested per series, newest first.
pub const OBSERVATION_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    #[serde(default)]
    value: Value,
}

/// Client for the FRED `series/observations` endpoint
#[derive(Debug, Clone)]
pub struct FredClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FredClient {
    /// Create a client; requests fail with `NotConfigured` while `api_key`
    /// is `None`.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }
}

/// First numeric, non-NaN value among observations ordered newest first.
///
/// FRED marks missing observations with `"."`; those, nulls and anything
/// unparseable are skipped.
fn first_numeric(observations: &[Observation]) -> Option<f64> {
    observations.iter().find_map(|obs| {
        let value = match &obs.value {
            Value::String(s) if s == "." => return None,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            Value::Number(n) => n.as_f64()?,
            _ => return None,
        };
        (!value.is_nan()).then_some(value)
    })
}

#[async_trait]
impl RateObservationService for FredClient {
    async fn latest_observation(&self, series_id: &str) -> Result<Option<f64>, FeedError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FeedError::NotConfigured("FRED API key is not configured".to_string()))?;

        let limit = OBSERVATION_LIMIT.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(FeedError::from_reqwest)?
            .error_for_status()
            .map_err(FeedError::from_reqwest)?;

        let body: ObservationsResponse = response.json().await.map_err(FeedError::from_reqwest)?;
        Ok(first_numeric(&body.observations))
    }
}
