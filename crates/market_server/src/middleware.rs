//! Request middleware
//!
//! - [`require_api_key`]: rejects market requests without a configured key
//! - [`log_requests`]: one structured log line and metrics per request

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Response extension recording whether the payload came from cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus(pub bool);

/// Reject requests whose `x-api-key` header is not one of the configured
/// keys. A no-op unless `api_key_required` is set.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.api_key_required {
        return Ok(next.run(request).await);
    }

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(key) if state.config.api_keys.iter().any(|k| k == key) => Ok(next.run(request).await),
        _ => {
            tracing::warn!(path = %request.uri().path(), "unauthorized request");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Log method, path, status, latency and cache outcome of every request.
///
/// Reuses an incoming `x-request-id` or assigns a new one, and echoes it
/// on the response.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let start = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    let cache_hit = response
        .extensions()
        .get::<CacheStatus>()
        .map(|c| c.0)
        .unwrap_or(false);

    tracing::info!(
        method = %method,
        path = %path,
        status,
        latency_ms = elapsed.as_secs_f64() * 1000.0,
        cache_hit,
        request_id = %request_id,
        "request"
    );

    metrics::counter!(
        "http_requests_total",
        "path" => path.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "path" => path.clone())
        .record(elapsed.as_secs_f64());
    if cache_hit {
        metrics::counter!("cache_hits_total", "path" => path).increment(1);
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
