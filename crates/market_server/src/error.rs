//! Error types for the HTTP boundary
//!
//! [`ServiceError`] is the failure taxonomy produced by the derivation
//! orchestrators. [`ApiError`] wraps it together with the request-level
//! failures (authentication, validation, timeouts) and renders every case
//! as a JSON body `{"code": <status>, "detail": <message>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for diagnostics attached to unexpected failures.
pub const MAX_DIAGNOSTIC_CHARS: usize = 200;

/// Failure taxonomy of the market-data orchestrators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// An upstream collaborator could not be reached or reported an error
    #[error("{0}")]
    Unavailable(String),

    /// The collaborator answered but yielded nothing usable
    #[error("{0}")]
    NotFound(String),

    /// Too few usable points survived to build the product
    #[error("{0}")]
    Insufficient(String),

    /// Anything else; carries a generic message only
    #[error("{0}")]
    Unexpected(String),
}

impl ServiceError {
    /// HTTP status for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unavailable(_) | ServiceError::Insufficient(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Timeout(String),
}

/// JSON error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub detail: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(e) => e.status(),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            code: status.as_u16(),
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Keep at most `max` characters of `message`.
///
/// Counts characters rather than bytes so multi-byte text is never split.
pub fn truncate_chars(message: &str, max: usize) -> String {
    message.chars().take(max).collect()
}
