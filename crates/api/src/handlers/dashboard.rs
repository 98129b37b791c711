//! Handlers for reading and refreshing the dashboard snapshot.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use storewatch_core::cooldown::Admission;
use storewatch_core::error::{remaining_minutes, CoreError};
use storewatch_core::types::DashboardData;
use storewatch_scrapers::TargetFailure;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the cooldown override credential.
pub const UPDATE_SECRET_HEADER: &str = "x-update-secret";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Result of a triggered aggregation run.
#[derive(Debug, Serialize)]
pub struct UpdateOutcome {
    /// The freshly aggregated snapshot, returned even if persisting it failed.
    pub snapshot: DashboardData,
    /// Whether the snapshot reached durable storage.
    pub persisted: bool,
    /// Targets whose lookup failed during this run.
    pub failures: Vec<TargetFailure>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /data
///
/// The current persisted snapshot, read from storage on every request.
pub async fn get_data(State(state): State<AppState>) -> AppResult<Json<DataResponse<DashboardData>>> {
    let snapshot = state
        .store
        .fetch()
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Dashboard data",
        })?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /update
///
/// Runs an aggregation if the cooldown since the last persisted run has
/// elapsed (or the `x-update-secret` header matches), then persists the new
/// snapshot. A persistence failure is reported as `persisted: false` rather
/// than an error, since the scrape itself succeeded.
pub async fn trigger_update(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<DataResponse<UpdateOutcome>>> {
    let credential = headers
        .get(UPDATE_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    // Fresh read: the gate must see the latest committed run.
    let previous = state.store.fetch().await?;
    let admission = state.gate.check(
        previous.as_ref().map(|s| s.last_update),
        credential,
        Utc::now(),
    );
    match admission {
        Admission::Accepted => {}
        Admission::Bypassed { remaining } => tracing::info!(
            remaining_minutes = remaining_minutes(&remaining),
            "Cooldown bypassed with override secret"
        ),
        Admission::RateLimited { remaining } => tracing::info!(
            remaining_minutes = remaining_minutes(&remaining),
            "Update rejected by cooldown"
        ),
    }
    admission.into_result()?;

    let report = state.aggregator.run(&state.catalog).await;
    if report.all_failed() {
        return Err(AppError::UpstreamFailed(format!(
            "All {} store lookups failed; previous snapshot kept",
            report.target_count
        )));
    }

    let persisted = match state.store.save(&report.snapshot).await {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(error = %err, "Persisting snapshot failed; returning unsaved result");
            false
        }
    };

    Ok(Json(DataResponse {
        data: UpdateOutcome {
            snapshot: report.snapshot,
            persisted,
            failures: report.failures,
        },
    }))
}
