//! Pricing endpoints
//!
//! Each route decodes its instrument, then hands it to the shared
//! [`PricingService`](crate::pricing::PricingService).

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::post,
    Router,
};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::pricing::{
    AmericanVanillaRequest, AsianRequest, FixedRateBondRequest, FutureRequest, PricingRequest,
    PricingResponse, VanillaRequest, ZeroCouponBondRequest,
};

/// Build the pricing routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/price/option/vanilla", post(vanilla_handler))
        .route("/price/option/american-vanilla", post(american_vanilla_handler))
        .route("/price/option/asian", post(asian_handler))
        .route("/price/future", post(future_handler))
        .route("/price/bond/zero-coupon", post(zero_coupon_bond_handler))
        .route("/price/bond/fixed-rate", post(fixed_rate_bond_handler))
}

fn decode<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(request)| request)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn price(state: &AppState, request: PricingRequest) -> ApiResult<Json<PricingResponse>> {
    Ok(Json(state.pricing.price(request).await?))
}

/// POST /price/option/vanilla
async fn vanilla_handler(
    State(state): State<AppState>,
    body: Result<Json<VanillaRequest>, JsonRejection>,
) -> ApiResult<Json<PricingResponse>> {
    price(&state, PricingRequest::Vanilla(decode(body)?)).await
}

/// POST /price/option/american-vanilla
async fn american_vanilla_handler(
    State(state): State<AppState>,
    body: Result<Json<AmericanVanillaRequest>, JsonRejection>,
) -> ApiResult<Json<PricingResponse>> {
    price(&state, PricingRequest::AmericanVanilla(decode(body)?)).await
}

/// POST /price/option/asian
async fn asian_handler(
    State(state): State<AppState>,
    body: Result<Json<AsianRequest>, JsonRejection>,
) -> ApiResult<Json<PricingResponse>> {
    price(&state, PricingRequest::Asian(decode(body)?)).await
}

/// POST /price/future
async fn future_handler(
    State(state): State<AppState>,
    body: Result<Json<FutureRequest>, JsonRejection>,
) -> ApiResult<Json<PricingResponse>> {
    price(&state, PricingRequest::Future(decode(body)?)).await
}

/// POST /price/bond/zero-coupon
async fn zero_coupon_bond_handler(
    State(state): State<AppState>,
    body: Result<Json<ZeroCouponBondRequest>, JsonRejection>,
) -> ApiResult<Json<PricingResponse>> {
    price(&state, PricingRequest::ZeroCouponBond(decode(body)?)).await
}

/// POST /price/bond/fixed-rate
async fn fixed_rate_bond_handler(
    State(state): State<AppState>,
    body: Result<Json<FixedRateBondRequest>, JsonRejection>,
) -> ApiResult<Json<PricingResponse>> {
    price(&state, PricingRequest::FixedRateBond(decode(body)?)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::pricing::{Greeks, PricingError, PricingProvider, PricingService};
    use crate::testing::test_state;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Prices every instrument at its path length, echoing the path.
    struct EchoEngine;

    #[async_trait]
    impl PricingProvider for EchoEngine {
        async fn price(&self, request: &PricingRequest) -> Result<PricingResponse, PricingError> {
            Ok(PricingResponse {
                npv: request.path().len() as f64,
                greeks: Greeks {
                    delta: Some(0.5),
                    ..Greeks::default()
                },
                diagnostics: request.path().to_string(),
                mc_std_error: 0.0,
            })
        }
    }

    struct SlowEngine;

    #[async_trait]
    impl PricingProvider for SlowEngine {
        async fn price(&self, _request: &PricingRequest) -> Result<PricingResponse, PricingError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(PricingError::Engine("unreachable".into()))
        }
    }

    fn router_with(provider: Arc<dyn PricingProvider>, timeout: Duration) -> Router {
        let mut state = test_state(ServerConfig::default());
        state.pricing = PricingService::new(provider, timeout);
        routes().with_state(state)
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn option_body() -> Value {
        json!({
            "spot": 100.0, "strike": 100.0, "maturity": 1.0,
            "rate": 0.05, "dividend": 0.0, "vol": 0.2, "is_call": true
        })
    }

    #[tokio::test]
    async fn test_every_instrument_reaches_engine() {
        let cases = [
            ("/price/option/vanilla", option_body()),
            ("/price/option/american-vanilla", option_body()),
            ("/price/option/asian", option_body()),
            (
                "/price/future",
                json!({"spot": 100.0, "strike": 95.0, "maturity": 0.5, "rate": 0.03, "dividend": 0.01}),
            ),
            ("/price/bond/zero-coupon", json!({"maturity": 5.0, "rate": 0.04})),
            (
                "/price/bond/fixed-rate",
                json!({"maturity": 5.0, "rate": 0.04, "coupon_rate": 0.05, "coupon_frequency": 2}),
            ),
        ];

        for (uri, body) in cases {
            let router = router_with(Arc::new(EchoEngine), Duration::from_secs(1));
            let (status, response) = post_json(router, uri, body).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(response["diagnostics"], uri);
            assert_eq!(response["npv"], uri.len() as f64);
            assert_eq!(response["greeks"]["delta"], 0.5);
            assert!(response["greeks"]["gamma"].is_null());
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let router = router_with(Arc::new(EchoEngine), Duration::from_secs(1));
        let (status, body) = post_json(router, "/price/option/vanilla", json!({"spot": 100.0})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("strike"));
    }

    #[tokio::test]
    async fn test_field_constraints_are_bad_request() {
        let mut body = option_body();
        body["vol"] = json!(0.0);
        let router = router_with(Arc::new(EchoEngine), Duration::from_secs(1));
        let (status, response) = post_json(router, "/price/option/vanilla", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], 400);

        let mut body = option_body();
        body["tree_steps"] = json!(3);
        let router = router_with(Arc::new(EchoEngine), Duration::from_secs(1));
        let (status, _) = post_json(router, "/price/option/american-vanilla", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_disabled_engine_is_unavailable() {
        let router = routes().with_state(test_state(ServerConfig::default()));
        let (status, body) = post_json(router, "/price/option/asian", option_body()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Pricing engine unavailable");
    }

    #[tokio::test]
    async fn test_slow_engine_times_out() {
        let router = router_with(Arc::new(SlowEngine), Duration::from_millis(50));
        let (status, body) = post_json(router, "/price/option/vanilla", option_body()).await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Pricing timed out after"));
    }

    #[tokio::test]
    async fn test_pricing_routes_are_post_only() {
        let router = routes().with_state(test_state(ServerConfig::default()));

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/price/option/vanilla")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
