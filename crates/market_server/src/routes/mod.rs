//! Route modules for the market server
//!
//! This module contains endpoint group-specific routers:
//! - health: Health check and readiness endpoints
//! - market: Cached market-data endpoints (API-key protected)
//! - pricing: Pricing endpoints delegated to the pricing engine

pub mod health;
pub mod market;
pub mod pricing;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::middleware::{log_requests, require_api_key};
use crate::pricing::PricingService;
use crate::services::MarketDataService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Market-data orchestrators and their caches
    pub market: Arc<MarketDataService>,
    /// Pricing boundary
    pub pricing: PricingService,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        config: Arc<ServerConfig>,
        market: Arc<MarketDataService>,
        pricing: PricingService,
    ) -> Self {
        Self {
            config,
            market,
            pricing,
            start_time: std::time::Instant::now(),
        }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any).allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins).allow_headers(Any)
    }
}

/// Build the main application router by merging all route modules
pub fn build_router(state: AppState) -> Router {
    let market = market::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_api_key,
    ));

    Router::new()
        .merge(health::routes())
        .merge(market)
        .merge(pricing::routes())
        .layer(middleware::from_fn(log_requests))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{API_KEY_HEADER, REQUEST_ID_HEADER};
    use crate::testing::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router_with(config: ServerConfig) -> Router {
        build_router(test_state(config))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_build_router_creates_valid_router() {
        let router = router_with(ServerConfig::default());

        let response = router.oneshot(get("/health")).await.unwrap();

        // Health endpoint should return 200
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_merges_all_route_groups() {
        let router = router_with(ServerConfig::default());

        let response = router.clone().oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router.clone().oneshot(get("/market/tickers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // No engine configured in tests
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/price/future")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"spot":100,"strike":95,"maturity":1,"rate":0.05,"dividend":0}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let router = router_with(ServerConfig::default());

        let response = router.oneshot(get("/unknown/path")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn keyed_config() -> ServerConfig {
        ServerConfig {
            api_key_required: true,
            api_keys: vec!["k1".to_string(), "k2".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_market_routes_require_key_when_enabled() {
        let router = router_with(keyed_config());

        let response = router.clone().oneshot(get("/market/tickers")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Unauthorized");

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/market/tickers")
                    .header(API_KEY_HEADER, "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/market/tickers")
                    .header(API_KEY_HEADER, "k2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_open_when_keys_required() {
        let router = router_with(keyed_config());
        let response = router.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_assigned_or_propagated() {
        let router = router_with(ServerConfig::default());

        let response = router.clone().oneshot(get("/health")).await.unwrap();
        let assigned = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_eq!(assigned.to_str().unwrap().len(), 36);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let router = router_with(ServerConfig::default());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_app_state_uptime() {
        let state = test_state(ServerConfig::default());

        // Wait a tiny bit
        std::thread::sleep(std::time::Duration::from_millis(10));

        let elapsed = state.start_time.elapsed();
        assert!(elapsed.as_millis() >= 10);
    }

    #[tokio::test]
    async fn test_app_state_config_access() {
        let config = ServerConfig {
            port: 9999,
            ..Default::default()
        };
        let state = test_state(config);

        assert_eq!(state.config.port, 9999);
    }
}
