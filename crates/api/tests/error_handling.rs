//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::TimeDelta;
use http_body_util::BodyExt;
use storewatch_api::error::AppError;
use storewatch_core::error::CoreError;
use storewatch_storage::StorageError;

/// Helper: convert an `AppError` into its status code, headers and parsed JSON body.
async fn error_to_response(
    err: AppError,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, headers, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Dashboard data",
    });

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Dashboard data not found");
}

// ---------------------------------------------------------------------------
// Test: CoreError::RateLimited maps to 429 with Retry-After
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_error_returns_429_with_retry_after() {
    let err = AppError::Core(CoreError::RateLimited {
        remaining: TimeDelta::seconds(90),
    });

    let (status, headers, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers["retry-after"], "90");
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["retry_after_minutes"], 2);
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Duplicate app id 'x'".into()));

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Duplicate app id 'x'");
}

// ---------------------------------------------------------------------------
// Test: storage errors map to 500 without leaking details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn storage_error_returns_sanitized_500() {
    let err = AppError::Storage(StorageError::Status {
        status: 401,
        body: "Bad credentials".into(),
    });

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: AppError::UpstreamFailed maps to 502
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_failed_returns_502() {
    let err = AppError::UpstreamFailed("All 4 store lookups failed".into());

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_FAILED");
    assert_eq!(json["error"], "All 4 store lookups failed");
}
