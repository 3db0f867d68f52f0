//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub posthog: PostHogSettings,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// PostHog gateway settings
#[derive(Debug, Clone, Deserialize)]
pub struct PostHogSettings {
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Gateway API key. Required; the server refuses to start without it.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_internal_domain")]
    pub internal_domain: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_gateway_url() -> String {
    "https://api.datagen.dev".to_string()
}

fn default_internal_domain() -> String {
    "datagen.dev".to_string()
}

fn default_request_timeout() -> u64 {
    30_000
}

impl Default for PostHogSettings {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            api_key: String::new(),
            internal_domain: default_internal_domain(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// API server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8088
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Result cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Validity window for cached gateway responses, in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("pulseboard").join("config.toml")),
            Some(PathBuf::from("/etc/pulseboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Gateway overrides
        if let Ok(url) = std::env::var("PULSEBOARD_GATEWAY_URL") {
            self.posthog.gateway_url = url;
        }
        if let Ok(key) = std::env::var("PULSEBOARD_API_KEY") {
            self.posthog.api_key = key;
        }
        if let Ok(domain) = std::env::var("PULSEBOARD_INTERNAL_DOMAIN") {
            self.posthog.internal_domain = domain;
        }

        // API overrides
        if let Ok(host) = std::env::var("PULSEBOARD_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("PULSEBOARD_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Cache overrides
        if let Ok(ttl) = std::env::var("PULSEBOARD_CACHE_TTL_SECS") {
            if let Ok(t) = ttl.parse() {
                self.cache.ttl_secs = t;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("PULSEBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PULSEBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Pulseboard Configuration
#
# Environment variables override these settings:
# - PULSEBOARD_GATEWAY_URL
# - PULSEBOARD_API_KEY
# - PULSEBOARD_INTERNAL_DOMAIN
# - PULSEBOARD_HOST
# - PULSEBOARD_PORT
# - PULSEBOARD_CACHE_TTL_SECS
# - PULSEBOARD_LOG_LEVEL
# - PULSEBOARD_LOG_FORMAT

[posthog]
# Tool-execution gateway fronting PostHog
gateway_url = "https://api.datagen.dev"

# Gateway API key (required)
api_key = ""

# Email domain of internal/test accounts, excluded from all reports
internal_domain = "datagen.dev"

# Gateway request timeout (ms)
request_timeout_ms = 30000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8088

[cache]
# How long gateway responses stay valid (seconds)
ttl_secs = 300

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.posthog.internal_domain, "datagen.dev");
        assert!(config.posthog.api_key.is_empty());
        assert_eq!(config.api.port, 8088);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[posthog]\napi_key = \"pk-test\"\n\n[cache]\nttl_secs = 60\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.posthog.api_key, "pk-test");
        assert_eq!(config.cache.ttl_secs, 60);
        // Unspecified sections keep their defaults.
        assert_eq!(config.api.port, 8088);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not toml at all [").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.cache.ttl_secs, 300);
    }
}
