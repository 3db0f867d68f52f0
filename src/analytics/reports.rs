//! Report Engine
//!
//! Assembles the three dashboard sections. Each section is one
//! sequential chain of cache lookup, gateway call, parse, and
//! aggregation; section failures are independent of each other.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::analytics::aggregate::{
    active_user_summary, error_summary, hourly_histogram, page_view_summary, top_n, trend_deltas,
    ActiveUserSummary, ErrorSummary, PageViewSummary, TrendDelta,
};
use crate::cache::ResultCache;
use crate::posthog::client::{
    PostHogError, ToolExecutor, ERROR_DETAILS_TOOL, LIST_ERRORS_TOOL, QUERY_RUN_TOOL,
};
use crate::posthog::parse::{
    parse_breakdown, parse_errors, parse_table, parse_trend, BreakdownRow, ErrorRecord,
    SeriesPoint,
};
use crate::posthog::query::{self, QuerySpec};

/// How many entries the ranked lists carry.
const TOP_LIMIT: u32 = 10;

/// One day of the page-view trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageViewDay {
    pub date: String,
    pub views: f64,
    pub unique_users: f64,
}

/// One day of the error timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDay {
    pub date: String,
    pub error_count: f64,
    pub affected_users: f64,
}

/// One day of the per-type error timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorTypeDay {
    pub date: String,
    pub error_type: String,
    pub count: f64,
}

/// Assembled page-view section.
#[derive(Debug, Clone)]
pub struct PageViewReport {
    pub trend: Vec<PageViewDay>,
    pub deltas: Vec<TrendDelta>,
    pub summary: Option<PageViewSummary>,
    pub top_pages: Vec<BreakdownRow>,
    pub traffic_sources: Vec<BreakdownRow>,
}

/// Assembled active-user section.
#[derive(Debug, Clone)]
pub struct ActiveUserReport {
    pub trend: Vec<SeriesPoint>,
    pub summary: Option<ActiveUserSummary>,
    pub countries: Vec<BreakdownRow>,
    pub hourly: Option<[f64; 24]>,
}

/// Assembled error-tracking section.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub errors: Vec<ErrorRecord>,
    pub summary: Option<ErrorSummary>,
    pub timeline: Vec<ErrorDay>,
    pub by_type: Vec<ErrorTypeDay>,
    pub top_errors: Vec<BreakdownRow>,
}

/// Builds dashboard sections from cached gateway responses
pub struct ReportEngine {
    tools: Arc<dyn ToolExecutor>,
    cache: Arc<ResultCache>,
    internal_domain: String,
}

impl ReportEngine {
    pub fn new(
        tools: Arc<dyn ToolExecutor>,
        cache: Arc<ResultCache>,
        internal_domain: impl Into<String>,
    ) -> Self {
        Self {
            tools,
            cache,
            internal_domain: internal_domain.into(),
        }
    }

    /// Page-view analytics over the last `days` days.
    pub async fn page_views(&self, days: u32) -> Result<PageViewReport, PostHogError> {
        let trend_blocks = self
            .run_query(&query::daily_page_views(days, &self.internal_domain))
            .await?;
        let pages_blocks = self
            .run_query(&query::top_pages(days, TOP_LIMIT, &self.internal_domain))
            .await?;
        let sources_blocks = self
            .run_query(&query::traffic_sources(days, TOP_LIMIT, &self.internal_domain))
            .await?;

        let trend: Vec<PageViewDay> = parse_table(&trend_blocks)
            .into_iter()
            .filter_map(|row| {
                Some(PageViewDay {
                    date: row.first()?.clone(),
                    views: row.get(1)?.parse().ok()?,
                    unique_users: row.get(2)?.parse().ok()?,
                })
            })
            .collect();

        let views: Vec<SeriesPoint> = trend
            .iter()
            .map(|day| SeriesPoint {
                date: day.date.clone(),
                value: day.views,
            })
            .collect();
        let users: Vec<SeriesPoint> = trend
            .iter()
            .map(|day| SeriesPoint {
                date: day.date.clone(),
                value: day.unique_users,
            })
            .collect();

        Ok(PageViewReport {
            summary: page_view_summary(&views, &users),
            deltas: trend_deltas(&views),
            trend,
            top_pages: table_to_ranking(&pages_blocks),
            traffic_sources: table_to_ranking(&sources_blocks),
        })
    }

    /// Active-user analytics: 30-day trend, 7-day country breakdown,
    /// 7-day hour-of-day activity pattern.
    pub async fn active_users(&self) -> Result<ActiveUserReport, PostHogError> {
        let trend_blocks = self.run_query(&query::dau_trend()).await?;
        let country_blocks = self.run_query(&query::dau_by_country()).await?;
        let hourly_blocks = self.run_query(&query::dau_by_hour()).await?;

        let trend = parse_trend(&trend_blocks);
        let countries = top_n(&parse_breakdown(&country_blocks), TOP_LIMIT as usize);
        let hourly = hourly_histogram(&parse_trend(&hourly_blocks));

        Ok(ActiveUserReport {
            summary: active_user_summary(&trend),
            trend,
            countries,
            hourly,
        })
    }

    /// Error tracking: record list, summary, daily timeline, per-type
    /// timeline, and the top errors by occurrence.
    pub async fn errors(&self, timeline_days: u32) -> Result<ErrorReport, PostHogError> {
        let list_blocks = self
            .cache
            .get_or_fetch(LIST_ERRORS_TOOL, || {
                self.tools.execute_tool(LIST_ERRORS_TOOL, json!({}))
            })
            .await?;
        let timeline_blocks = self.run_query(&query::error_timeline(timeline_days)).await?;
        let by_type_blocks = self
            .run_query(&query::error_timeline_by_type(timeline_days))
            .await?;

        let errors = parse_errors(&list_blocks);

        let timeline = parse_table(&timeline_blocks)
            .into_iter()
            .filter_map(|row| {
                Some(ErrorDay {
                    date: row.first()?.clone(),
                    error_count: row.get(1)?.parse().ok()?,
                    affected_users: row.get(2)?.parse().ok()?,
                })
            })
            .collect();

        let by_type = parse_table(&by_type_blocks)
            .into_iter()
            .filter_map(|row| {
                Some(ErrorTypeDay {
                    date: row.first()?.clone(),
                    error_type: row.get(1)?.clone(),
                    count: row.get(2)?.parse().ok()?,
                })
            })
            .collect();

        let ranked: Vec<BreakdownRow> = errors
            .iter()
            .map(|e| BreakdownRow {
                label: e.name.clone(),
                count: e.occurrences,
            })
            .collect();

        Ok(ErrorReport {
            summary: error_summary(&errors),
            top_errors: top_n(&ranked, TOP_LIMIT as usize),
            errors,
            timeline,
            by_type,
        })
    }

    /// Raw detail blocks for one error record.
    pub async fn error_details(&self, error_id: &str) -> Result<Vec<String>, PostHogError> {
        let key = format!("{}:{}", ERROR_DETAILS_TOOL, error_id);
        self.cache
            .get_or_fetch(&key, || {
                self.tools
                    .execute_tool(ERROR_DETAILS_TOOL, json!({ "error_id": error_id }))
            })
            .await
    }

    /// Clear all cached responses. Returns the number of evicted entries.
    ///
    /// The next request for any section refetches from the gateway.
    pub fn refresh(&self) -> usize {
        self.cache.clear()
    }

    async fn run_query(&self, spec: &QuerySpec) -> Result<Vec<String>, PostHogError> {
        let key = spec.cache_key();
        self.cache
            .get_or_fetch(&key, || {
                self.tools
                    .execute_tool(QUERY_RUN_TOOL, spec.tool_parameters())
            })
            .await
    }
}

/// Convert `[label, count]` table rows into a ranking.
fn table_to_ranking(blocks: &[String]) -> Vec<BreakdownRow> {
    parse_table(blocks)
        .into_iter()
        .filter_map(|row| {
            Some(BreakdownRow {
                label: row.first()?.clone(),
                count: row.get(1)?.parse().ok()?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub gateway returning canned blocks per tool.
    struct StubGateway {
        calls: AtomicUsize,
    }

    impl StubGateway {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ToolExecutor for StubGateway {
        async fn execute_tool(
            &self,
            tool: &str,
            parameters: Value,
        ) -> Result<Vec<String>, PostHogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match tool {
                LIST_ERRORS_TOOL => Ok(vec![
                    "id: err-1\nname: TypeError\nstatus: active\noccurrences: 12\nusers: 4\nsessions: 6".to_string(),
                    "id: err-2\nname: NetworkError\nstatus: resolved\noccurrences: 30\nusers: 9\nsessions: 11".to_string(),
                ]),
                ERROR_DETAILS_TOOL => Ok(vec![format!(
                    "detail for {}",
                    parameters["error_id"].as_str().unwrap_or("?")
                )]),
                QUERY_RUN_TOOL => {
                    let query = parameters["query"].to_string();
                    if query.contains("TrendsQuery") {
                        if query.contains("breakdownFilter") {
                            Ok(vec![
                                "label: United States\ncount: 11".to_string(),
                                "label: Germany\ncount: 4".to_string(),
                            ])
                        } else if query.contains("\"hour\"") {
                            Ok(vec![
                                "data[0]: 3,5\nlabels[0]: \"18-Nov-2025 13:00\",\"18-Nov-2025 14:00\"".to_string(),
                            ])
                        } else {
                            Ok(vec![
                                "data[0]: 10,15,12\nlabels[0]: 18-Nov-2025,19-Nov-2025,20-Nov-2025".to_string(),
                            ])
                        }
                    } else if query.contains("error_type") {
                        Ok(vec![" - [0]: 2025-11-20,TypeError,4".to_string()])
                    } else if query.contains("$exception") {
                        Ok(vec![" - [0]: 2025-11-20,6,2".to_string()])
                    } else if query.contains("current_url") || query.contains("referring_domain") {
                        Ok(vec![" - [0]: /docs,42\n - [1]: /,41".to_string()])
                    } else {
                        Ok(vec![" - [0]: 2025-11-20,310,9\n - [1]: 2025-11-21,271,7".to_string()])
                    }
                }
                other => Err(PostHogError::Api {
                    status: 404,
                    message: format!("unknown tool {}", other),
                }),
            }
        }
    }

    fn engine_with_stub() -> (ReportEngine, Arc<StubGateway>) {
        let stub = Arc::new(StubGateway::new());
        let cache = Arc::new(ResultCache::with_default_ttl());
        let engine = ReportEngine::new(stub.clone(), cache, "datagen.dev");
        (engine, stub)
    }

    #[tokio::test]
    async fn test_page_views_report() {
        let (engine, _) = engine_with_stub();
        let report = engine.page_views(7).await.unwrap();

        assert_eq!(report.trend.len(), 2);
        assert_eq!(report.trend[0].views, 310.0);
        let summary = report.summary.unwrap();
        assert_eq!(summary.total_views, 581.0);
        assert_eq!(summary.unique_users, 16.0);
        assert_eq!(report.deltas.len(), 1);
        assert_eq!(report.deltas[0].delta, -39.0);
        assert_eq!(report.top_pages[0].label, "/docs");
        assert_eq!(report.traffic_sources.len(), 2);
    }

    #[tokio::test]
    async fn test_active_users_report() {
        let (engine, _) = engine_with_stub();
        let report = engine.active_users().await.unwrap();

        assert_eq!(report.trend.len(), 3);
        let summary = report.summary.unwrap();
        assert_eq!(summary.latest_dau, 12.0);
        assert_eq!(summary.day_over_day.unwrap().pct, Some(-20.0));
        assert_eq!(report.countries[0].label, "United States");
        let hourly = report.hourly.unwrap();
        assert_eq!(hourly[13], 3.0);
        assert_eq!(hourly[14], 5.0);
    }

    #[tokio::test]
    async fn test_errors_report() {
        let (engine, _) = engine_with_stub();
        let report = engine.errors(30).await.unwrap();

        assert_eq!(report.errors.len(), 2);
        let summary = report.summary.unwrap();
        assert_eq!(summary.total_occurrences, 42);
        assert_eq!(summary.active_errors, 1);
        assert_eq!(report.timeline[0].error_count, 6.0);
        assert_eq!(report.by_type[0].error_type, "TypeError");
        // Ranked by occurrence, not list order.
        assert_eq!(report.top_errors[0].label, "NetworkError");
    }

    #[tokio::test]
    async fn test_reports_are_cached() {
        let (engine, stub) = engine_with_stub();

        engine.page_views(7).await.unwrap();
        let after_first = stub.calls.load(Ordering::SeqCst);
        engine.page_views(7).await.unwrap();

        assert_eq!(after_first, 3);
        assert_eq!(stub.calls.load(Ordering::SeqCst), after_first);
    }

    #[tokio::test]
    async fn test_refresh_forces_refetch() {
        let (engine, stub) = engine_with_stub();

        engine.page_views(7).await.unwrap();
        assert_eq!(engine.refresh(), 3);
        engine.page_views(7).await.unwrap();

        assert_eq!(stub.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_different_windows_are_distinct_cache_entries() {
        let (engine, stub) = engine_with_stub();

        engine.page_views(7).await.unwrap();
        engine.page_views(14).await.unwrap();

        assert_eq!(stub.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_error_details_keyed_by_id() {
        let (engine, stub) = engine_with_stub();

        let detail = engine.error_details("err-1").await.unwrap();
        assert_eq!(detail, vec!["detail for err-1"]);

        engine.error_details("err-1").await.unwrap();
        engine.error_details("err-2").await.unwrap();
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }
}
