//! Aggregators
//!
//! Pure, stateless transforms turning raw metric rows into
//! display-ready summaries. Empty input always yields an explicit
//! no-data result (`None` or an empty vec), never a zero-valued series
//! pretending to be real activity.

use serde::Serialize;

use crate::posthog::parse::{BreakdownRow, ErrorRecord, SeriesPoint};

/// Day-over-day change for one point of a trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDelta {
    pub date: String,
    pub delta: f64,
    /// Percentage change relative to the previous value; `None` when the
    /// previous value is zero (the percentage is undefined, not 0%).
    pub pct: Option<f64>,
}

/// Per-day deltas for each consecutive pair of points.
///
/// A series of n points yields n-1 deltas; fewer than two points yield none.
pub fn trend_deltas(points: &[SeriesPoint]) -> Vec<TrendDelta> {
    points
        .windows(2)
        .map(|pair| {
            let prev = pair[0].value;
            let current = &pair[1];
            TrendDelta {
                date: current.date.clone(),
                delta: current.value - prev,
                pct: (prev != 0.0).then(|| (current.value - prev) / prev * 100.0),
            }
        })
        .collect()
}

/// Mean of the last `window` values, or of all values when fewer exist.
pub fn rolling_average(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() || window == 0 {
        return None;
    }
    let tail = &values[values.len().saturating_sub(window)..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}

/// First `n` rows by count descending, stable on ties (rows with equal
/// counts keep their original relative order).
pub fn top_n(rows: &[BreakdownRow], n: usize) -> Vec<BreakdownRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Sum values into hour-of-day buckets (0-23).
///
/// Points whose label carries no `HH:MM` suffix are skipped. Returns
/// `None` when no point lands in any bucket, so an unparseable series is
/// reported as no data rather than a flat zero chart.
pub fn hourly_histogram(points: &[SeriesPoint]) -> Option<[f64; 24]> {
    let mut buckets = [0.0; 24];
    let mut matched = 0usize;
    for point in points {
        if let Some(hour) = hour_of_label(&point.date) {
            buckets[hour] += point.value;
            matched += 1;
        }
    }
    (matched > 0).then_some(buckets)
}

fn hour_of_label(label: &str) -> Option<usize> {
    let time = label.split_whitespace().last()?;
    if !time.contains(':') {
        return None;
    }
    let hour: usize = time.split(':').next()?.parse().ok()?;
    (hour < 24).then_some(hour)
}

// ============================================
// Section summaries
// ============================================

/// Headline numbers for the page-view section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageViewSummary {
    pub total_views: f64,
    pub unique_users: f64,
    pub avg_views_per_day: f64,
    /// `None` when no users were seen (the ratio is undefined).
    pub avg_views_per_user: Option<f64>,
}

pub fn page_view_summary(
    views: &[SeriesPoint],
    users: &[SeriesPoint],
) -> Option<PageViewSummary> {
    if views.is_empty() {
        return None;
    }
    let total_views: f64 = views.iter().map(|p| p.value).sum();
    let unique_users: f64 = users.iter().map(|p| p.value).sum();
    Some(PageViewSummary {
        total_views,
        unique_users,
        avg_views_per_day: total_views / views.len() as f64,
        avg_views_per_user: (unique_users > 0.0).then(|| total_views / unique_users),
    })
}

/// Headline numbers for the active-user section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveUserSummary {
    pub latest_dau: f64,
    /// Change from the previous day; `None` when there is only one day.
    pub day_over_day: Option<TrendDelta>,
    pub avg_7d: f64,
    pub avg_30d: f64,
}

pub fn active_user_summary(trend: &[SeriesPoint]) -> Option<ActiveUserSummary> {
    let latest = trend.last()?;
    let values: Vec<f64> = trend.iter().map(|p| p.value).collect();
    Some(ActiveUserSummary {
        latest_dau: latest.value,
        day_over_day: trend_deltas(trend).pop(),
        avg_7d: rolling_average(&values, 7)?,
        avg_30d: rolling_average(&values, 30)?,
    })
}

/// Headline numbers for the error-tracking section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub total_errors: usize,
    pub total_occurrences: u64,
    pub affected_users: u64,
    pub active_errors: usize,
}

pub fn error_summary(errors: &[ErrorRecord]) -> Option<ErrorSummary> {
    if errors.is_empty() {
        return None;
    }
    Some(ErrorSummary {
        total_errors: errors.len(),
        total_occurrences: errors.iter().map(|e| e.occurrences).sum(),
        affected_users: errors.iter().map(|e| e.users).sum(),
        active_errors: errors.iter().filter(|e| e.is_active()).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                date: format!("2025-11-{:02}", i + 1),
                value,
            })
            .collect()
    }

    #[test]
    fn test_trend_deltas() {
        let deltas = trend_deltas(&series(&[10.0, 15.0, 12.0]));
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].delta, 5.0);
        assert_eq!(deltas[0].pct, Some(50.0));
        assert_eq!(deltas[1].delta, -3.0);
        assert_eq!(deltas[1].pct, Some(-20.0));
        assert_eq!(deltas[1].date, "2025-11-03");
    }

    #[test]
    fn test_trend_delta_pct_undefined_from_zero() {
        let deltas = trend_deltas(&series(&[0.0, 8.0]));
        assert_eq!(deltas[0].delta, 8.0);
        assert_eq!(deltas[0].pct, None);
    }

    #[test]
    fn test_trend_deltas_short_input() {
        assert!(trend_deltas(&[]).is_empty());
        assert!(trend_deltas(&series(&[5.0])).is_empty());
    }

    #[test]
    fn test_rolling_average_partial_window() {
        // Fewer rows than the window: average over what exists, no padding.
        assert_eq!(rolling_average(&[4.0, 6.0, 8.0], 7), Some(6.0));
    }

    #[test]
    fn test_rolling_average_uses_last_window() {
        let values = [100.0, 1.0, 2.0, 3.0];
        assert_eq!(rolling_average(&values, 3), Some(2.0));
    }

    #[test]
    fn test_rolling_average_empty() {
        assert_eq!(rolling_average(&[], 7), None);
    }

    #[test]
    fn test_top_n_stable_on_ties() {
        let rows = vec![
            BreakdownRow { label: "A".into(), count: 5 },
            BreakdownRow { label: "B".into(), count: 9 },
            BreakdownRow { label: "C".into(), count: 9 },
            BreakdownRow { label: "D".into(), count: 1 },
        ];
        let ranked = top_n(&rows, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "B");
        assert_eq!(ranked[1].label, "C");
    }

    #[test]
    fn test_top_n_empty() {
        assert!(top_n(&[], 5).is_empty());
    }

    #[test]
    fn test_hourly_histogram_sums_buckets() {
        let points = vec![
            SeriesPoint { date: "18-Nov-2025 13:00".into(), value: 3.0 },
            SeriesPoint { date: "19-Nov-2025 13:00".into(), value: 4.0 },
            SeriesPoint { date: "19-Nov-2025 02:00".into(), value: 1.0 },
        ];
        let buckets = hourly_histogram(&points).unwrap();
        assert_eq!(buckets[13], 7.0);
        assert_eq!(buckets[2], 1.0);
        assert_eq!(buckets[0], 0.0);
    }

    #[test]
    fn test_hourly_histogram_no_parseable_hours() {
        let points = series(&[1.0, 2.0]);
        assert_eq!(hourly_histogram(&points), None);
        assert_eq!(hourly_histogram(&[]), None);
    }

    #[test]
    fn test_page_view_summary() {
        let views = series(&[100.0, 200.0]);
        let users = series(&[10.0, 20.0]);
        let summary = page_view_summary(&views, &users).unwrap();
        assert_eq!(summary.total_views, 300.0);
        assert_eq!(summary.unique_users, 30.0);
        assert_eq!(summary.avg_views_per_day, 150.0);
        assert_eq!(summary.avg_views_per_user, Some(10.0));
    }

    #[test]
    fn test_page_view_summary_zero_users() {
        let views = series(&[100.0]);
        let summary = page_view_summary(&views, &[]).unwrap();
        assert_eq!(summary.avg_views_per_user, None);
    }

    #[test]
    fn test_page_view_summary_empty() {
        assert_eq!(page_view_summary(&[], &[]), None);
    }

    #[test]
    fn test_active_user_summary() {
        let summary = active_user_summary(&series(&[10.0, 15.0, 12.0])).unwrap();
        assert_eq!(summary.latest_dau, 12.0);
        let dod = summary.day_over_day.unwrap();
        assert_eq!(dod.delta, -3.0);
        assert_eq!(dod.pct, Some(-20.0));
        assert_eq!(summary.avg_7d, 37.0 / 3.0);
        assert_eq!(summary.avg_30d, 37.0 / 3.0);
    }

    #[test]
    fn test_active_user_summary_empty() {
        assert_eq!(active_user_summary(&[]), None);
    }

    #[test]
    fn test_error_summary_counts_active() {
        let errors = vec![
            ErrorRecord {
                status: "active".into(),
                occurrences: 10,
                users: 3,
                ..Default::default()
            },
            ErrorRecord {
                status: "resolved".into(),
                occurrences: 5,
                users: 2,
                ..Default::default()
            },
        ];
        let summary = error_summary(&errors).unwrap();
        assert_eq!(summary.total_errors, 2);
        assert_eq!(summary.total_occurrences, 15);
        assert_eq!(summary.affected_users, 5);
        assert_eq!(summary.active_errors, 1);
    }

    #[test]
    fn test_error_summary_empty() {
        assert_eq!(error_summary(&[]), None);
    }
}
