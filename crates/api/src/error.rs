use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storewatch_core::error::{remaining_minutes, CoreError};
use storewatch_storage::StorageError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`StorageError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `storewatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Snapshot storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Every store lookup of an aggregation run failed.
    #[error("{0}")]
    UpstreamFailed(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::RateLimited { remaining } => {
                    return rate_limited(remaining, core.to_string());
                }
            },

            // --- Storage errors ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Snapshot storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::UpstreamFailed(msg) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 429 with the wait time both as a `Retry-After` header (seconds) and in
/// the body (minutes).
fn rate_limited(remaining: &chrono::TimeDelta, message: String) -> Response {
    let minutes = remaining_minutes(remaining);
    let body = json!({
        "error": message,
        "code": "RATE_LIMITED",
        "retry_after_minutes": minutes,
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
    let seconds = remaining.num_seconds().max(1);
    if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
        response.headers_mut().insert(RETRY_AFTER, value);
    }
    response
}
