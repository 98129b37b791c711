//! Route definitions for the dashboard snapshot.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// ```text
/// GET  /data      -> get_data
/// POST /update    -> trigger_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/data", get(dashboard::get_data))
        .route("/update", post(dashboard::trigger_update))
}
