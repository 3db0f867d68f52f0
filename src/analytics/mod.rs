//! Analytics
//!
//! Pure aggregation of metric rows and the report engine that turns
//! cached gateway responses into dashboard sections.

pub mod aggregate;
pub mod reports;

pub use aggregate::{
    active_user_summary, error_summary, hourly_histogram, page_view_summary, rolling_average,
    top_n, trend_deltas, ActiveUserSummary, ErrorSummary, PageViewSummary, TrendDelta,
};
pub use reports::{
    ActiveUserReport, ErrorDay, ErrorReport, ErrorTypeDay, PageViewDay, PageViewReport,
    ReportEngine,
};

// Re-export the row types aggregators consume, so the API layer can
// name them without reaching into the parsing module.
pub use crate::posthog::parse::{BreakdownRow, ErrorRecord, SeriesPoint};
