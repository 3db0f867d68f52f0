//! # Pulseboard
//!
//! Product analytics dashboard service: a thin presentation layer over
//! PostHog, reached through a managed tool-execution gateway.
//!
//! ## Features
//!
//! - **Query templates**: HogQL and trends payloads with internal
//!   accounts always excluded
//! - **Result cache**: five-minute memoization of gateway responses
//!   with a manual refresh control
//! - **Aggregators**: trend deltas, rolling averages, stable top-N
//!   rankings, hour-of-day histograms
//! - **JSON API**: three independently-loading dashboard sections
//!
//! ## Modules
//!
//! - [`posthog`]: Gateway client, query construction, result parsing
//! - [`cache`]: Time-boxed result cache
//! - [`analytics`]: Aggregators and the report engine
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pulseboard::analytics::ReportEngine;
//! use pulseboard::api::{serve, ApiConfig, AppState};
//! use pulseboard::cache::ResultCache;
//! use pulseboard::posthog::{PostHogClient, PostHogConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(PostHogClient::new(PostHogConfig {
//!         api_key: "pk-...".to_string(),
//!         ..Default::default()
//!     }));
//!     let cache = Arc::new(ResultCache::with_default_ttl());
//!     let reports = Arc::new(ReportEngine::new(client, Arc::clone(&cache), "datagen.dev"));
//!
//!     let config = ApiConfig::default();
//!     let state = AppState::new(reports, cache, config.clone(), true);
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod cache;
pub mod config;
pub mod posthog;

// Re-export top-level types for convenience
pub use analytics::{
    ActiveUserReport, ActiveUserSummary, ErrorReport, ErrorSummary, PageViewReport,
    PageViewSummary, ReportEngine, TrendDelta,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use cache::{ResultCache, DEFAULT_TTL};

pub use config::{Config, ConfigError, LoggingConfig};

pub use posthog::{
    BreakdownRow, DateRange, ErrorRecord, PostHogClient, PostHogConfig, PostHogError, QuerySpec,
    SeriesPoint, ToolExecutor, TrendsQueryBuilder,
};
