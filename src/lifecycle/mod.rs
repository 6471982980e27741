//! Lifecycle controller — session bootstrap, serving, and shutdown.
//!
//! ```text
//!   start ──► connect (strategy) ──► Session{bridge} ──► serve ─┬─ Cancelled ─► Ok(())
//!                │                                               └─ Closed ────► reconnect? / Err
//!                └─ Err(Connection)
//! ```

pub mod credential;
pub mod signals;
pub mod strategy;

pub use credential::{connection_url, normalize_credential, redacted};
pub use signals::{termination_signal, Termination};
pub use strategy::{Backoff, ConnectionStrategy, FailFast};

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::bridge::InvocationBridge;
use crate::session::{Session, SessionEnd, UpstreamStream};
use crate::types::{Config, Error, Result};

/// Owns the configuration, the bridge and the connection policy.
#[derive(Debug)]
pub struct LifecycleController {
    config: Config,
    url: Url,
    bridge: Arc<InvocationBridge>,
    strategy: Arc<dyn ConnectionStrategy>,
}

impl LifecycleController {
    /// Validate `config` and prepare everything short of connecting.
    pub fn new(config: Config, strategy: Arc<dyn ConnectionStrategy>) -> Result<Self> {
        config.validate()?;
        let bridge = Arc::new(InvocationBridge::from_config(&config.backend)?);
        let credential = normalize_credential(&config.upstream.token);
        let url = connection_url(&config.upstream.endpoint, &credential)?;

        Ok(Self {
            config,
            url,
            bridge,
            strategy,
        })
    }

    /// Controller with the strategy selected by `config.upstream.reconnect`.
    pub fn from_config(config: Config) -> Result<Self> {
        let strategy: Arc<dyn ConnectionStrategy> = if config.upstream.reconnect {
            Arc::new(Backoff::default())
        } else {
            Arc::new(FailFast)
        };
        Self::new(config, strategy)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connection URL, credential included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Establish the upstream session with the bridge bound as its handler.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<Session<UpstreamStream>> {
        tracing::info!(endpoint = %redacted(&self.url), "Connecting to upstream");
        let stream = self.strategy.connect(&self.url, cancel).await?;

        let tools: Vec<&str> = self
            .bridge
            .list_tools()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        tracing::info!(?tools, "Upstream session established");

        Ok(Session::new(stream, self.bridge.clone()))
    }

    /// Serve until cancelled (`Ok`) or until the session is lost for good (`Err`).
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let grace = self.config.shutdown.grace_period;

        loop {
            let session = match self.start(&cancel).await {
                Ok(session) => session,
                Err(_) if cancel.is_cancelled() => return Ok(()),
                Err(e) => return Err(e),
            };

            match session.serve(cancel.clone(), grace).await {
                SessionEnd::Cancelled => {
                    tracing::info!("Session stopped by shutdown request");
                    return Ok(());
                }
                SessionEnd::Closed if cancel.is_cancelled() => return Ok(()),
                SessionEnd::Closed if self.strategy.reconnect_on_close() => {
                    tracing::warn!("Upstream session lost, reconnecting");
                }
                SessionEnd::Closed => {
                    return Err(Error::connection("upstream closed the session"));
                }
            }
        }
    }
}

/// Cancel `cancel` on the first termination signal.
pub fn cancel_on_signal(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match termination_signal().await {
            Ok(Termination::Interrupt) => tracing::info!("Interrupted, shutting down"),
            Ok(Termination::Terminate) => tracing::info!("Terminate requested, shutting down"),
            Err(e) => tracing::error!("Signal handler failed, shutting down: {}", e),
        }
        cancel.cancel();
    })
}
