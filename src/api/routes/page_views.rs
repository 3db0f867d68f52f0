//! Page View Routes
//!
//! - GET /api/v1/analytics/page-views - trend, summary, top pages, and
//!   traffic sources, internal accounts excluded

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::dto::{PageViewsResponse, Section};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

const DEFAULT_WINDOW_DAYS: u32 = 7;
const MAX_WINDOW_DAYS: u32 = 90;

#[derive(Debug, Deserialize)]
pub struct PageViewParams {
    /// Trailing window in days (default 7)
    pub days: Option<u32>,
}

/// GET /api/v1/analytics/page-views
pub async fn get_page_views(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageViewParams>,
) -> ApiResult<Json<PageViewsResponse>> {
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days < 1 || days > MAX_WINDOW_DAYS {
        return Err(ApiError::Validation(format!(
            "days must be between 1 and {}",
            MAX_WINDOW_DAYS
        )));
    }

    let report = state.reports.page_views(days).await?;

    Ok(Json(PageViewsResponse {
        window_days: days,
        summary: Section::of(report.summary),
        trend: Section::of_vec(report.trend),
        deltas: Section::of_vec(report.deltas),
        top_pages: Section::of_vec(report.top_pages),
        traffic_sources: Section::of_vec(report.traffic_sources),
    }))
}
