//! Automation backend client.
//!
//! The backend is an opaque HTTP endpoint: it receives the JSON payload and
//! answers with a text body. Any HTTP status counts as a reply; only transport
//! failures and the deadline surface as [`Error::Backend`].

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};

use super::payload::OutboundPayload;
use crate::types::{BackendConfig, Error, Result};

/// Raw reply from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub status: u16,
    pub body: String,
}

/// Outbound call capability used by the invocation bridge.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionBackend: Send + Sync {
    /// Deliver one payload. Never retried.
    async fn dispatch(&self, payload: &OutboundPayload) -> Result<BackendReply>;
}

/// reqwest-backed webhook client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.client_tag.clone())
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ActionBackend for HttpBackend {
    async fn dispatch(&self, payload: &OutboundPayload) -> Result<BackendReply> {
        // The client-level timeout covers connect, send and body read; dropping
        // the future on expiry closes the socket.
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(BackendReply { status, body })
    }
}
