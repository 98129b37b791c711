//! Route tree.
//!
//! ```text
//! /health                 service health (root level)
//!
//! /api/v1/data            current snapshot (GET)
//! /api/v1/update          trigger aggregation (POST, optional x-update-secret)
//! ```

pub mod dashboard;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(dashboard::router())
}
