//! Refresh Route
//!
//! - POST /api/v1/refresh - drop every cached response
//!
//! Bound to the dashboard's manual refresh control. The UI re-requests
//! all currently visible sections after this returns.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::RefreshResponse;
use crate::api::state::AppState;

/// POST /api/v1/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let cleared = state.reports.refresh();

    tracing::info!(cleared, "manual refresh requested");

    Json(RefreshResponse {
        status: "ok".to_string(),
        cleared,
    })
}
