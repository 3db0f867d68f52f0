//! Data Transfer Objects
//!
//! Response types for the API endpoints, serialized to JSON. Every
//! chart-shaped payload is wrapped in a [`Section`] so that "no data"
//! is an explicit state, distinct from both errors and real zeroes.

use serde::Serialize;

use crate::analytics::{
    ActiveUserSummary, BreakdownRow, ErrorDay, ErrorRecord, ErrorSummary, ErrorTypeDay,
    PageViewDay, PageViewSummary, SeriesPoint, TrendDelta,
};

/// One independently-loadable piece of a dashboard section.
#[derive(Debug, Serialize)]
pub struct Section<T> {
    /// `"ok"` or `"no_data"`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Section<T> {
    pub fn of(data: Option<T>) -> Self {
        match data {
            Some(data) => Self {
                status: "ok",
                data: Some(data),
            },
            None => Self {
                status: "no_data",
                data: None,
            },
        }
    }
}

impl<T> Section<Vec<T>> {
    /// An empty vec is "no data", not an empty chart.
    pub fn of_vec(items: Vec<T>) -> Self {
        Self::of((!items.is_empty()).then_some(items))
    }
}

/// One hour-of-day histogram bucket.
#[derive(Debug, Serialize)]
pub struct HourBucket {
    pub hour: u8,
    pub value: f64,
}

/// Expand a histogram array into labeled buckets.
pub fn hour_buckets(buckets: [f64; 24]) -> Vec<HourBucket> {
    buckets
        .iter()
        .enumerate()
        .map(|(hour, &value)| HourBucket {
            hour: hour as u8,
            value,
        })
        .collect()
}

// ============================================
// PAGE VIEW DTOs
// ============================================

/// Page-view analytics section
#[derive(Debug, Serialize)]
pub struct PageViewsResponse {
    pub window_days: u32,
    pub summary: Section<PageViewSummary>,
    pub trend: Section<Vec<PageViewDay>>,
    pub deltas: Section<Vec<TrendDelta>>,
    pub top_pages: Section<Vec<BreakdownRow>>,
    pub traffic_sources: Section<Vec<BreakdownRow>>,
}

// ============================================
// ACTIVE USER DTOs
// ============================================

/// Active-user analytics section
#[derive(Debug, Serialize)]
pub struct ActiveUsersResponse {
    pub summary: Section<ActiveUserSummary>,
    pub trend: Section<Vec<SeriesPoint>>,
    pub countries: Section<Vec<BreakdownRow>>,
    pub hourly: Section<Vec<HourBucket>>,
}

// ============================================
// ERROR TRACKING DTOs
// ============================================

/// Error-tracking section
#[derive(Debug, Serialize)]
pub struct ErrorsResponse {
    pub timeline_days: u32,
    pub summary: Section<ErrorSummary>,
    pub errors: Section<Vec<ErrorRecord>>,
    pub timeline: Section<Vec<ErrorDay>>,
    pub by_type: Section<Vec<ErrorTypeDay>>,
    pub top_errors: Section<Vec<BreakdownRow>>,
}

/// Detail blocks for a single error
#[derive(Debug, Serialize)]
pub struct ErrorDetailsResponse {
    pub id: String,
    pub detail: Vec<String>,
}

// ============================================
// CONTROL DTOs
// ============================================

/// Manual refresh result
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    /// Cache entries evicted; visible sections should re-request now
    pub cleared: usize,
}

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub gateway_configured: bool,
    pub cache_entries: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_of_vec_empty_is_no_data() {
        let section: Section<Vec<u32>> = Section::of_vec(Vec::new());
        assert_eq!(section.status, "no_data");
        let json = serde_json::to_string(&section).unwrap();
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_section_of_vec_with_items() {
        let section = Section::of_vec(vec![1, 2]);
        assert_eq!(section.status, "ok");
        assert_eq!(section.data, Some(vec![1, 2]));
    }

    #[test]
    fn test_hour_buckets_labeling() {
        let mut histogram = [0.0; 24];
        histogram[13] = 7.0;
        let buckets = hour_buckets(histogram);
        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[13].hour, 13);
        assert_eq!(buckets[13].value, 7.0);
    }
}
