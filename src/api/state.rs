//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::analytics::ReportEngine;
use crate::cache::ResultCache;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Report engine assembling the dashboard sections
    pub reports: Arc<ReportEngine>,
    /// Result cache, exposed for the refresh control and health stats
    pub cache: Arc<ResultCache>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Whether a gateway API key was configured at startup
    pub gateway_configured: bool,
}

impl AppState {
    pub fn new(
        reports: Arc<ReportEngine>,
        cache: Arc<ResultCache>,
        config: ApiConfig,
        gateway_configured: bool,
    ) -> Self {
        Self {
            reports,
            cache,
            config: Arc::new(config),
            start_time: Instant::now(),
            gateway_configured,
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8088,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
