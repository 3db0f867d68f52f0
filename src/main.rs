//! Pulseboard API Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from a TOML file (see `--generate-config`) with environment
//! overrides:
//! - `PULSEBOARD_GATEWAY_URL`: Tool-execution gateway URL
//! - `PULSEBOARD_API_KEY`: Gateway API key (required)
//! - `PULSEBOARD_INTERNAL_DOMAIN`: Internal email domain to exclude
//! - `PULSEBOARD_HOST` / `PULSEBOARD_PORT`: Bind address
//! - `PULSEBOARD_CACHE_TTL_SECS`: Cache validity window
//! - `RUST_LOG`: Log filter (default: pulseboard=info)

use clap::Parser;
use pulseboard::analytics::ReportEngine;
use pulseboard::api::{serve, ApiConfig, AppState};
use pulseboard::cache::ResultCache;
use pulseboard::config::{self, Config, LoggingConfig};
use pulseboard::posthog::{PostHogClient, PostHogConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pulseboard", version, about = "Product analytics dashboard service")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the API host
    #[arg(long)]
    host: Option<String>,

    /// Override the API port
    #[arg(long)]
    port: Option<u16>,

    /// Print a default config file and exit
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.generate_config {
        print!("{}", config::generate_default_config());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!(
        "Starting Pulseboard API server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // A missing credential is an operator problem, not something to
    // discover one failed dashboard section at a time.
    if config.posthog.api_key.is_empty() {
        anyhow::bail!(
            "gateway API key is not configured. Set api_key in the [posthog] section \
             of the config file or export PULSEBOARD_API_KEY=<key>."
        );
    }

    let client = Arc::new(PostHogClient::new(PostHogConfig {
        gateway_url: config.posthog.gateway_url.clone(),
        api_key: config.posthog.api_key.clone(),
        request_timeout_ms: config.posthog.request_timeout_ms,
    }));
    let cache = Arc::new(ResultCache::new(Duration::from_secs(config.cache.ttl_secs)));
    let reports = Arc::new(ReportEngine::new(
        client,
        Arc::clone(&cache),
        config.posthog.internal_domain.clone(),
    ));

    let api_config = ApiConfig::new(config.api.host.clone(), config.api.port);
    let state = AppState::new(reports, cache, api_config.clone(), true);

    tracing::info!("Gateway: {}", config.posthog.gateway_url);
    tracing::info!("Excluding internal domain: {}", config.posthog.internal_domain);
    tracing::info!("Cache TTL: {}s", config.cache.ttl_secs);

    serve(state, &api_config).await?;

    tracing::info!("Pulseboard stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "pulseboard={},tower_http=debug",
            logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
