//! Configuration structures.
//!
//! Configuration is assembled once at startup (from CLI flags and environment
//! variables in the binary) and handed to the lifecycle controller and the
//! invocation bridge by value. Nothing reads ambient settings after that.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::types::{Error, Result};

/// Default upstream MCP endpoint.
pub const DEFAULT_ENDPOINT: &str = "wss://api.xiaozhi.me/mcp/";

/// Origin tag stamped on every outbound payload.
pub const DEFAULT_ORIGIN: &str = "xiaozhi_ai_mcp";

/// Global bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Automation backend configuration.
    pub backend: BackendConfig,

    /// Upstream session configuration.
    pub upstream: UpstreamConfig,

    /// Shutdown behaviour.
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl Config {
    pub fn new(backend_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            backend: BackendConfig::new(backend_url),
            upstream: UpstreamConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                token: token.into(),
                reconnect: false,
            },
            shutdown: ShutdownConfig::default(),
        }
    }

    /// Reject missing or malformed settings before any connection attempt.
    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            return Err(Error::configuration("backend URL (N8N_WEBHOOK_URL) is not set"));
        }
        let backend = Url::parse(&self.backend.url).map_err(|e| {
            Error::configuration(format!("backend URL {:?} is invalid: {}", self.backend.url, e))
        })?;
        if !matches!(backend.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "backend URL must be http(s), got scheme {:?}",
                backend.scheme()
            )));
        }
        if self.backend.timeout.is_zero() {
            return Err(Error::configuration("backend timeout must be positive"));
        }

        if self.upstream.token.trim().is_empty() {
            return Err(Error::configuration("upstream token (XIAOZHI_MCP_TOKEN) is not set"));
        }
        let endpoint = Url::parse(&self.upstream.endpoint).map_err(|e| {
            Error::configuration(format!(
                "upstream endpoint {:?} is invalid: {}",
                self.upstream.endpoint, e
            ))
        })?;
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(Error::configuration(format!(
                "upstream endpoint must be ws(s), got scheme {:?}",
                endpoint.scheme()
            )));
        }
        Ok(())
    }
}

/// Automation backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Webhook URL receiving the JSON payload.
    pub url: String,

    /// Deadline for one outbound call, measured from send.
    #[serde(with = "humantime_serde", default = "default_backend_timeout")]
    pub timeout: Duration,

    /// Value of the `origen` payload field.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// User-Agent sent with every backend call.
    #[serde(default = "default_client_tag")]
    pub client_tag: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: default_backend_timeout(),
            origin: default_origin(),
            client_tag: default_client_tag(),
        }
    }
}

fn default_backend_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_client_tag() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Upstream session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// WebSocket endpoint of the assistant platform.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Pre-issued access token, or a full endpoint URL carrying `token=`.
    pub token: String,

    /// Re-establish the session with backoff instead of exiting.
    #[serde(default)]
    pub reconnect: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Shutdown behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// How long in-flight invocations may run after a termination signal.
    #[serde(with = "humantime_serde")]
    pub grace_period: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config::new("https://n8n.example.com/webhook/xiaozhi-action", "tok")
    }

    #[test]
    fn test_defaults() {
        let config = valid();
        assert_eq!(config.backend.timeout, Duration::from_secs(10));
        assert_eq!(config.backend.origin, "xiaozhi_ai_mcp");
        assert!(config.backend.client_tag.starts_with("n8n-mcp-bridge/"));
        assert_eq!(config.upstream.endpoint, DEFAULT_ENDPOINT);
        assert!(!config.upstream.reconnect);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_backend_url_is_rejected() {
        let mut config = valid();
        config.backend.url = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("N8N_WEBHOOK_URL"));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let mut config = valid();
        config.upstream.token = String::new();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_non_websocket_endpoint_is_rejected() {
        let mut config = valid();
        config.upstream.endpoint = "https://api.xiaozhi.me/mcp/".to_string();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_non_http_backend_is_rejected() {
        let mut config = valid();
        config.backend.url = "ftp://n8n.example.com/hook".to_string();
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_deserialize_with_humantime_durations() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "backend": { "url": "http://localhost:5678/webhook/a", "timeout": "3s" },
            "upstream": { "token": "abc" },
            "shutdown": { "grace_period": "250ms" },
        }))
        .unwrap();

        assert_eq!(config.backend.timeout, Duration::from_secs(3));
        assert_eq!(config.backend.origin, DEFAULT_ORIGIN);
        assert_eq!(config.upstream.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.shutdown.grace_period, Duration::from_millis(250));
    }
}
