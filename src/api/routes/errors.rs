//! Error Tracking Routes
//!
//! - GET /api/v1/errors - error records, summary, and timelines
//! - GET /api/v1/errors/:id - detail blocks for one error

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::dto::{ErrorDetailsResponse, ErrorsResponse, Section};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

const DEFAULT_TIMELINE_DAYS: u32 = 30;
const MAX_TIMELINE_DAYS: u32 = 90;

#[derive(Debug, Deserialize)]
pub struct ErrorsParams {
    /// Timeline window in days (default 30)
    pub timeline_days: Option<u32>,
}

/// GET /api/v1/errors
pub async fn get_errors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ErrorsParams>,
) -> ApiResult<Json<ErrorsResponse>> {
    let timeline_days = params.timeline_days.unwrap_or(DEFAULT_TIMELINE_DAYS);
    if timeline_days < 1 || timeline_days > MAX_TIMELINE_DAYS {
        return Err(ApiError::Validation(format!(
            "timeline_days must be between 1 and {}",
            MAX_TIMELINE_DAYS
        )));
    }

    let report = state.reports.errors(timeline_days).await?;

    Ok(Json(ErrorsResponse {
        timeline_days,
        summary: Section::of(report.summary),
        errors: Section::of_vec(report.errors),
        timeline: Section::of_vec(report.timeline),
        by_type: Section::of_vec(report.by_type),
        top_errors: Section::of_vec(report.top_errors),
    }))
}

/// GET /api/v1/errors/:id
pub async fn get_error_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ErrorDetailsResponse>> {
    if id.trim().is_empty() {
        return Err(ApiError::Validation("error id cannot be empty".to_string()));
    }

    let detail = state.reports.error_details(&id).await?;
    if detail.is_empty() {
        return Err(ApiError::NotFound(format!("error {}", id)));
    }

    Ok(Json(ErrorDetailsResponse { id, detail }))
}
