//! PostHog Access Layer
//!
//! Everything that touches the analytics backend: query payload
//! construction, the tool-execution gateway client, and parsers for the
//! gateway's text-block results.

pub mod client;
pub mod parse;
pub mod query;

pub use client::{
    PostHogClient, PostHogConfig, PostHogError, ToolExecutor, ERROR_DETAILS_TOOL,
    LIST_ERRORS_TOOL, QUERY_RUN_TOOL,
};
pub use parse::{
    parse_breakdown, parse_errors, parse_table, parse_trend, BreakdownRow, ErrorRecord,
    SeriesPoint, BREAKDOWN_NULL_SENTINEL,
};
pub use query::{
    dau_by_country, dau_by_hour, dau_trend, daily_page_views, error_timeline,
    error_timeline_by_type, exclusion_clause, top_pages, traffic_sources, DateRange, QuerySpec,
    TrendsQueryBuilder, DEFAULT_INTERNAL_DOMAIN,
};
