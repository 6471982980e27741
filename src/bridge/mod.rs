//! Invocation bridge — turns a tool call into one backend POST.
//!
//! Per invocation: `Received → Validated → Dispatched → {Succeeded | Failed}`.
//! There is no retry transition. Name and argument problems come back as
//! `Err` (protocol-level); everything that goes wrong after validation is
//! folded into an `isError` envelope so the session keeps serving.

pub mod backend;
pub mod envelope;
pub mod payload;
pub mod request;

pub use backend::{ActionBackend, BackendReply, HttpBackend};
pub use envelope::{ContentBlock, ResponseEnvelope};
pub use payload::OutboundPayload;
pub use request::ExecuteAction;

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::tools::{ToolCatalog, ToolDescriptor, EXECUTE_ACTION};
use crate::types::{BackendConfig, Error, Result};

/// Characters of the backend body echoed to the log.
const LOG_BODY_PREVIEW: usize = 100;

/// Catalog provider and invocation handler shared by every session request.
pub struct InvocationBridge {
    catalog: ToolCatalog,
    backend: Arc<dyn ActionBackend>,
    origin: String,
    deadline: Duration,
}

impl std::fmt::Debug for InvocationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationBridge")
            .field("tools", &self.catalog.len())
            .field("origin", &self.origin)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl InvocationBridge {
    pub fn new(
        catalog: ToolCatalog,
        backend: Arc<dyn ActionBackend>,
        origin: impl Into<String>,
        deadline: Duration,
    ) -> Self {
        Self {
            catalog,
            backend,
            origin: origin.into(),
            deadline,
        }
    }

    /// Bridge over the HTTP webhook described by `config`.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::new(
            ToolCatalog::builtin(),
            Arc::new(backend),
            config.origin.clone(),
            config.timeout,
        ))
    }

    /// The advertised tools. Identical on every call.
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        tracing::debug!(count = self.catalog.len(), "Tool list requested");
        self.catalog.list()
    }

    /// Handle one `tools/call`.
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<ResponseEnvelope> {
        if name != EXECUTE_ACTION || !self.catalog.has_tool(name) {
            tracing::warn!(tool = name, "Call to unknown tool");
            return Err(Error::unknown_tool(name));
        }

        let request = ExecuteAction::from_arguments(&self.catalog, arguments)?;

        let span = tracing::info_span!("invocation", id = %Uuid::new_v4(), action = %request.action);
        Ok(self.execute(&request).instrument(span).await)
    }

    async fn execute(&self, request: &ExecuteAction) -> ResponseEnvelope {
        let payload = OutboundPayload::stamp_now(request, &self.origin);
        tracing::info!(
            action_target = %request.target,
            action_value = %request.value,
            "Dispatching to backend"
        );

        let outcome = match tokio::time::timeout(self.deadline, self.backend.dispatch(&payload)).await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(Error::backend(format!(
                "no reply within {}s",
                self.deadline.as_secs_f64()
            ))),
        };

        match outcome {
            Ok(reply) => {
                tracing::info!(
                    status = reply.status,
                    body = %preview(&reply.body),
                    "Backend replied"
                );
                ResponseEnvelope::success(format!(
                    "Action \"{}\" completed. Response: {}",
                    request.action, reply.body
                ))
            }
            Err(err) => {
                tracing::error!(error = %err, "Backend call failed");
                ResponseEnvelope::failure(format!(
                    "Action \"{}\" failed: {}",
                    request.action, err
                ))
            }
        }
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(LOG_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
