//! Query Construction
//!
//! Builds the two query payload styles the PostHog gateway accepts:
//! ad-hoc HogQL table queries and structured trends queries. Every
//! person-scoped HogQL template embeds the internal-domain exclusion
//! clause; every trends query sets `filterTestAccounts`.

use serde::Serialize;
use serde_json::{json, Value};

/// Email domain of internal/test accounts, excluded from every report.
pub const DEFAULT_INTERNAL_DOMAIN: &str = "datagen.dev";

/// Relative date range in PostHog notation (e.g. `-7d` to now).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub date_from: String,
    pub date_to: Option<String>,
}

impl DateRange {
    /// Range covering the last `days` days up to now.
    pub fn last_days(days: u32) -> Self {
        Self {
            date_from: format!("-{}d", days),
            date_to: None,
        }
    }
}

/// A single event series in a trends query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventsNode {
    kind: &'static str,
    pub event: String,
    pub math: String,
    pub custom_name: String,
}

/// Breakdown dimension for splitting a trend into sub-series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownFilter {
    pub breakdown: String,
    pub breakdown_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendsQuery {
    kind: &'static str,
    pub series: Vec<EventsNode>,
    #[serde(rename = "dateRange")]
    pub date_range: DateRange,
    pub interval: String,
    #[serde(rename = "filterTestAccounts")]
    pub filter_test_accounts: bool,
    #[serde(rename = "breakdownFilter", skip_serializing_if = "Option::is_none")]
    pub breakdown_filter: Option<BreakdownFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HogQlQuery {
    kind: &'static str,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
enum QuerySource {
    HogQl(HogQlQuery),
    Trends(TrendsQuery),
}

/// An immutable query payload for the gateway's query-run tool.
///
/// Identity for caching purposes is the canonical JSON serialization
/// (see [`QuerySpec::cache_key`]); two specs are equivalent exactly when
/// their serializations are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySpec {
    kind: &'static str,
    source: QuerySource,
}

impl QuerySpec {
    /// Wrap raw HogQL text in a `DataVisualizationNode` envelope.
    pub fn hogql(query: impl Into<String>) -> Self {
        Self {
            kind: "DataVisualizationNode",
            source: QuerySource::HogQl(HogQlQuery {
                kind: "HogQLQuery",
                query: query.into(),
            }),
        }
    }

    fn trends(query: TrendsQuery) -> Self {
        Self {
            kind: "InsightVizNode",
            source: QuerySource::Trends(query),
        }
    }

    /// Canonical cache key: the JSON serialization of the query body.
    ///
    /// Field order comes from the struct definitions, so the key is
    /// deterministic for structurally equal specs.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).expect("query spec serializes to JSON")
    }

    /// Parameters for the gateway's query-run tool.
    pub fn tool_parameters(&self) -> Value {
        json!({ "query": self })
    }
}

/// Builder for the trends query style.
///
/// Trends queries always exclude flagged test accounts via the built-in
/// `filterTestAccounts` toggle.
#[derive(Debug, Clone)]
pub struct TrendsQueryBuilder {
    event: String,
    math: String,
    custom_name: String,
    interval: String,
    date_range: DateRange,
    breakdown_filter: Option<BreakdownFilter>,
}

impl TrendsQueryBuilder {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            math: "dau".to_string(),
            custom_name: "Daily Active Users".to_string(),
            interval: "day".to_string(),
            date_range: DateRange::last_days(30),
            breakdown_filter: None,
        }
    }

    pub fn math(mut self, math: impl Into<String>) -> Self {
        self.math = math.into();
        self
    }

    pub fn custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = name.into();
        self
    }

    /// Bucket interval: `day` or `hour`.
    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn breakdown(
        mut self,
        breakdown: impl Into<String>,
        breakdown_type: impl Into<String>,
    ) -> Self {
        self.breakdown_filter = Some(BreakdownFilter {
            breakdown: breakdown.into(),
            breakdown_type: breakdown_type.into(),
        });
        self
    }

    pub fn build(self) -> QuerySpec {
        QuerySpec::trends(TrendsQuery {
            kind: "TrendsQuery",
            series: vec![EventsNode {
                kind: "EventsNode",
                event: self.event,
                math: self.math,
                custom_name: self.custom_name,
            }],
            date_range: self.date_range,
            interval: self.interval,
            filter_test_accounts: true,
            breakdown_filter: self.breakdown_filter,
        })
    }
}

/// SQL clause excluding events from accounts under the internal domain.
///
/// Events without a person email pass the filter (anonymous traffic counts).
pub fn exclusion_clause(domain: &str) -> String {
    format!(
        "(person.properties.email NOT LIKE '%@{}' OR person.properties.email IS NULL)",
        domain
    )
}

// ============================================
// HogQL templates (ad-hoc filtered-table style)
// ============================================

/// Daily page views and unique users over the last `days` days.
pub fn daily_page_views(days: u32, domain: &str) -> QuerySpec {
    QuerySpec::hogql(format!(
        "SELECT\n    toDate(timestamp) as date,\n    count() as page_views,\n    uniq(person_id) as unique_users\nFROM events\nWHERE event = 'page_viewed'\n    AND timestamp >= now() - INTERVAL {} DAY\n    AND {}\nGROUP BY date\nORDER BY date",
        days,
        exclusion_clause(domain)
    ))
}

/// Top pages by view count over the last `days` days.
pub fn top_pages(days: u32, limit: u32, domain: &str) -> QuerySpec {
    QuerySpec::hogql(format!(
        "SELECT\n    properties.$current_url as page,\n    count() as views\nFROM events\nWHERE event = 'page_viewed'\n    AND timestamp >= now() - INTERVAL {} DAY\n    AND {}\nGROUP BY page\nORDER BY views DESC\nLIMIT {}",
        days,
        exclusion_clause(domain),
        limit
    ))
}

/// Traffic sources by referring domain over the last `days` days.
pub fn traffic_sources(days: u32, limit: u32, domain: &str) -> QuerySpec {
    QuerySpec::hogql(format!(
        "SELECT\n    properties.$referring_domain as referrer,\n    count() as visits\nFROM events\nWHERE event = '$pageview'\n    AND timestamp >= now() - INTERVAL {} DAY\n    AND properties.$referring_domain IS NOT NULL\n    AND {}\nGROUP BY referrer\nORDER BY visits DESC\nLIMIT {}",
        days,
        exclusion_clause(domain),
        limit
    ))
}

/// Daily exception occurrences and affected users over the last `days` days.
///
/// Exception events carry no person email filter; internal errors are
/// just as real as external ones.
pub fn error_timeline(days: u32) -> QuerySpec {
    QuerySpec::hogql(format!(
        "SELECT\n    toDate(timestamp) as date,\n    count() as error_count,\n    uniq(person_id) as affected_users\nFROM events\nWHERE event = '$exception'\n    AND timestamp >= now() - INTERVAL {} DAY\nGROUP BY date\nORDER BY date",
        days
    ))
}

/// Daily exception counts split by exception type over the last `days` days.
pub fn error_timeline_by_type(days: u32) -> QuerySpec {
    QuerySpec::hogql(format!(
        "SELECT\n    toDate(timestamp) as date,\n    replaceAll(arrayElement(JSONExtractArrayRaw(properties, '$exception_types'), 1), '\"', '') as error_type,\n    count() as count\nFROM events\nWHERE event = '$exception'\n    AND timestamp >= now() - INTERVAL {} DAY\nGROUP BY date, error_type\nORDER BY date, count DESC",
        days
    ))
}

// ============================================
// Trend templates
// ============================================

/// 30-day daily active user trend.
pub fn dau_trend() -> QuerySpec {
    TrendsQueryBuilder::new("$pageview").build()
}

/// 7-day DAU broken down by country.
pub fn dau_by_country() -> QuerySpec {
    TrendsQueryBuilder::new("$pageview")
        .date_range(DateRange::last_days(7))
        .breakdown("$geoip_country_name", "event")
        .custom_name("DAU by Country")
        .build()
}

/// 7-day DAU at hourly resolution, for the hour-of-day activity pattern.
pub fn dau_by_hour() -> QuerySpec {
    TrendsQueryBuilder::new("$pageview")
        .date_range(DateRange::last_days(7))
        .interval("hour")
        .custom_name("DAU by Hour")
        .build()
}
