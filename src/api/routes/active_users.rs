//! Active User Routes
//!
//! - GET /api/v1/analytics/active-users - 30-day DAU trend with summary,
//!   country breakdown, and hour-of-day activity pattern

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{hour_buckets, ActiveUsersResponse, Section};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/v1/analytics/active-users
pub async fn get_active_users(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ActiveUsersResponse>> {
    let report = state.reports.active_users().await?;

    Ok(Json(ActiveUsersResponse {
        summary: Section::of(report.summary),
        trend: Section::of_vec(report.trend),
        countries: Section::of_vec(report.countries),
        hourly: Section::of(report.hourly.map(hour_buckets)),
    }))
}
