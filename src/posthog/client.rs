//! PostHog Gateway Client
//!
//! HTTP client for the managed tool-execution gateway that fronts
//! PostHog. Queries, the error list, and error details are all reached
//! by executing named tools against the gateway.
//!
//! Failed calls surface immediately; there is no automatic retry. The
//! dashboard recovers by the user re-requesting a section or refreshing.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tool executing a PostHog query (HogQL or trends payload).
pub const QUERY_RUN_TOOL: &str = "mcp_Posthog_query_run";
/// Tool listing error-tracking records for the project.
pub const LIST_ERRORS_TOOL: &str = "mcp_Posthog_list_errors";
/// Tool fetching the detail blocks for one error.
pub const ERROR_DETAILS_TOOL: &str = "mcp_Posthog_error_details";

/// Configuration for the gateway client
#[derive(Debug, Clone)]
pub struct PostHogConfig {
    /// Base URL of the tool-execution gateway
    pub gateway_url: String,
    /// API key, sent as a bearer token
    pub api_key: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for PostHogConfig {
    fn default() -> Self {
        Self {
            gateway_url: "https://api.datagen.dev".to_string(),
            api_key: String::new(),
            request_timeout_ms: 30_000,
        }
    }
}

/// Seam between the dashboard and the gateway.
///
/// The production implementation is [`PostHogClient`]; tests substitute
/// a stub returning canned result blocks.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a named tool and return its result blocks.
    async fn execute_tool(&self, tool: &str, parameters: Value)
        -> Result<Vec<String>, PostHogError>;
}

/// Gateway client over reqwest
pub struct PostHogClient {
    client: Client,
    config: PostHogConfig,
}

impl PostHogClient {
    /// Create a new client with the given configuration
    pub fn new(config: PostHogConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Get the current configuration
    pub fn config(&self) -> &PostHogConfig {
        &self.config
    }
}

#[async_trait]
impl ToolExecutor for PostHogClient {
    async fn execute_tool(
        &self,
        tool: &str,
        parameters: Value,
    ) -> Result<Vec<String>, PostHogError> {
        let url = format!("{}/v1/tools/execute", self.config.gateway_url);

        let body = ExecuteRequest {
            tool_name: tool,
            parameters,
        };

        tracing::debug!(tool = %tool, "executing gateway tool");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PostHogError::Timeout
                } else if e.is_connect() {
                    PostHogError::Unavailable
                } else {
                    PostHogError::Request(e)
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let message = response.text().await.unwrap_or_default();
            return Err(PostHogError::Auth(message));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PostHogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result: ExecuteResponse = response.json().await.map_err(PostHogError::Request)?;

        // Result items are usually text blocks; anything structured is
        // carried through as its JSON rendering.
        Ok(result
            .result
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    tool_name: &'a str,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    result: Vec<Value>,
}

/// Errors that can occur when talking to the gateway
#[derive(Error, Debug)]
pub enum PostHogError {
    /// The gateway rejected the API key. The message is surfaced to the
    /// user as an actionable instruction.
    #[error("authentication failed: {0}. Check the configured gateway API key.")]
    Auth(String),

    #[error("PostHog gateway unavailable")]
    Unavailable,

    #[error("request timeout")]
    Timeout,

    #[error("gateway error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PostHogConfig::default();
        assert_eq!(config.gateway_url, "https://api.datagen.dev");
        assert!(config.api_key.is_empty());
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_execute_response_tolerates_missing_result() {
        let parsed: ExecuteResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.result.is_empty());

        let parsed: ExecuteResponse =
            serde_json::from_str(r#"{"result": ["block one", {"k": 1}]}"#).unwrap();
        assert_eq!(parsed.result.len(), 2);
    }

    #[test]
    fn test_auth_error_message_is_actionable() {
        let err = PostHogError::Auth("invalid key".to_string());
        assert!(err.to_string().contains("API key"));
    }
}
