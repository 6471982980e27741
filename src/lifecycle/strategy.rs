//! Connection strategies for the upstream session.
//!
//! The default is fail-fast: one attempt, and a lost session ends the
//! process so an external supervisor can restart it. [`Backoff`] retries
//! with exponential delays and re-dials after the peer closes.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::session::UpstreamStream;
use crate::types::{Error, Result};

/// Policy for establishing (and re-establishing) the upstream session.
#[async_trait]
pub trait ConnectionStrategy: Send + Sync + std::fmt::Debug {
    /// Dial `url`, giving up early if `cancel` fires.
    async fn connect(&self, url: &Url, cancel: &CancellationToken) -> Result<UpstreamStream>;

    /// Whether a session closed by the peer should be dialed again.
    fn reconnect_on_close(&self) -> bool {
        false
    }
}

async fn dial(url: &Url) -> Result<UpstreamStream> {
    let (stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
    Ok(stream)
}

/// Single attempt, no reconnection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

#[async_trait]
impl ConnectionStrategy for FailFast {
    async fn connect(&self, url: &Url, cancel: &CancellationToken) -> Result<UpstreamStream> {
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::connection("cancelled before connecting")),
            result = dial(url) => result,
        }
    }
}

/// Exponential backoff between attempts, reconnecting after closure.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    /// Delay before attempt `attempt + 1` (attempts are 1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[async_trait]
impl ConnectionStrategy for Backoff {
    async fn connect(&self, url: &Url, cancel: &CancellationToken) -> Result<UpstreamStream> {
        let attempts = self.max_attempts.max(1);
        let mut last_error = Error::connection("no connection attempt made");

        for attempt in 1..=attempts {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(Error::connection("cancelled while connecting"));
                }
                result = dial(url) => match result {
                    Ok(stream) => return Ok(stream),
                    Err(e) => {
                        tracing::warn!(attempt, max_attempts = attempts, error = %e, "Connection attempt failed");
                        last_error = e;
                    }
                },
            }

            if attempt < attempts {
                let delay = self.delay_after(attempt);
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Err(Error::connection("cancelled while connecting"));
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        Err(last_error)
    }

    fn reconnect_on_close(&self) -> bool {
        true
    }
}
