//! Pulseboard REST API
//!
//! HTTP API layer built with Axum. Each dashboard section loads
//! independently; a failure in one never affects the others.
//!
//! # Endpoints
//!
//! ## Analytics
//! - `GET /api/v1/analytics/page-views` - Page view analytics
//! - `GET /api/v1/analytics/active-users` - DAU analytics
//!
//! ## Error tracking
//! - `GET /api/v1/errors` - Error records and timelines
//! - `GET /api/v1/errors/:id` - Details for one error
//!
//! ## Control
//! - `POST /api/v1/refresh` - Clear cached responses
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Analytics sections
        .route(
            "/analytics/page-views",
            get(routes::page_views::get_page_views),
        )
        .route(
            "/analytics/active-users",
            get(routes::active_users::get_active_users),
        )
        // Error tracking
        .route("/errors", get(routes::errors::get_errors))
        .route("/errors/:id", get(routes::errors::get_error_details))
        // Manual refresh control
        .route("/refresh", post(routes::refresh::refresh));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Pulseboard API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Pulseboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
