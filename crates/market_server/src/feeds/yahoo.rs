//! Yahoo Finance option chain client
//!
//! Talks to the public `v7/finance/options` JSON endpoint. Contract rows are
//! decoded field by field so one malformed row never fails the whole chain.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use market_core::market_data::OptionContract;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{FeedError, OptionsChainService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    option_chain: OptionChain,
}

#[derive(Debug, Deserialize)]
struct OptionChain {
    #[serde(default)]
    result: Vec<ChainResult>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<ChainOptions>,
}

#[derive(Debug, Default, Deserialize)]
struct ChainOptions {
    #[serde(default)]
    calls: Vec<Value>,
}

/// Client for Yahoo Finance option chains
#[derive(Debug, Clone)]
pub struct YahooOptionsClient {
    client: Client,
    base_url: String,
}

impl YahooOptionsClient {
    /// Create a client rooted at `base_url` (`.../v7/finance/options`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("market_server/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, ticker: &str, date: Option<i64>) -> Result<Option<ChainResult>, FeedError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ticker);
        let mut request = self.client.get(url);
        if let Some(ts) = date {
            request = request.query(&[("date", ts)]);
        }

        let response = request.send().await.map_err(FeedError::from_reqwest)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FeedError::NotFound(format!("no option chain for {ticker}")));
        }
        let response = response.error_for_status().map_err(FeedError::from_reqwest)?;
        let envelope: Envelope = response.json().await.map_err(FeedError::from_reqwest)?;
        first_result(envelope.option_chain)
    }
}

fn first_result(chain: OptionChain) -> Result<Option<ChainResult>, FeedError> {
    match (chain.result.into_iter().next(), chain.error) {
        (Some(result), _) => Ok(Some(result)),
        (None, Some(err)) if !err.is_null() => Err(FeedError::Decode(err.to_string())),
        (None, _) => Ok(None),
    }
}

fn to_date(unix_secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.date_naive())
}

fn to_unix(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Decode one call row; rows without a numeric strike are dropped.
fn parse_contract(row: &Value) -> Option<OptionContract> {
    let strike = row.get("strike")?.as_f64()?;
    let open_interest = row.get("openInterest").and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
    });
    let implied_volatility = row.get("impliedVolatility").and_then(Value::as_f64);

    Some(OptionContract {
        strike,
        open_interest,
        implied_volatility,
    })
}

#[async_trait]
impl OptionsChainService for YahooOptionsClient {
    async fn expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>, FeedError> {
        let Some(result) = self.fetch(ticker, None).await? else {
            return Ok(Vec::new());
        };
        let mut dates: Vec<NaiveDate> = result.expiration_dates.into_iter().filter_map(to_date).collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    async fn calls(
        &self,
        ticker: &str,
        expiration: NaiveDate,
    ) -> Result<Vec<OptionContract>, FeedError> {
        let Some(result) = self.fetch(ticker, Some(to_unix(expiration))).await? else {
            return Ok(Vec::new());
        };
        Ok(result
            .options
            .iter()
            .flat_map(|o| o.calls.iter())
            .filter_map(parse_contract)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_contract_full_row() {
        let row = json!({"strike": 450.0, "openInterest": 1200, "impliedVolatility": 0.18});
        let contract = parse_contract(&row).unwrap();
        assert_eq!(contract.strike, 450.0);
        assert_eq!(contract.open_interest, Some(1200));
        assert_eq!(contract.implied_volatility, Some(0.18));
    }

    #[test]
    fn test_parse_contract_tolerates_missing_fields() {
        let row = json!({"strike": 100});
        let contract = parse_contract(&row).unwrap();
        assert_eq!(contract.strike, 100.0);
        assert_eq!(contract.open_interest, None);
        assert_eq!(contract.implied_volatility, None);

        assert!(parse_contract(&json!({"openInterest": 10})).is_none());
        assert!(parse_contract(&json!({"strike": "abc"})).is_none());
    }

    #[test]
    fn test_unix_date_conversion() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        assert_eq!(to_date(to_unix(date)), Some(date));
        assert_eq!(to_unix(date), 1_718_928_000);
    }

    #[test]
    fn test_envelope_decoding() {
        let body = json!({
            "optionChain": {
                "result": [{
                    "expirationDates": [1718928000, 1719532800],
                    "options": [{"calls": [{"strike": 1.0}, {"bad": true}]}]
                }],
                "error": null
            }
        });
        let envelope: Envelope = serde_json::from_value(body).unwrap();
        let result = first_result(envelope.option_chain).unwrap().unwrap();
        assert_eq!(result.expiration_dates.len(), 2);
        assert_eq!(result.options[0].calls.len(), 2);
    }

    #[test]
    fn test_empty_result_without_error_is_none() {
        let envelope: Envelope =
            serde_json::from_value(json!({"optionChain": {"result": [], "error": null}})).unwrap();
        assert!(first_result(envelope.option_chain).unwrap().is_none());
    }

    #[test]
    fn test_upstream_error_is_decode_failure() {
        let envelope: Envelope = serde_json::from_value(
            json!({"optionChain": {"result": [], "error": {"code": "Bad Request"}}}),
        )
        .unwrap();
        assert!(matches!(
            first_result(envelope.option_chain),
            Err(FeedError::Decode(_))
        ));
    }
}
