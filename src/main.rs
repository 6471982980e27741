//! n8n MCP bridge — main entry point.
//!
//! Connects to the assistant platform's MCP endpoint, advertises the
//! `execute_action` tool and forwards each call to the n8n webhook.
//!
//! Exit status: 0 after a termination signal, 1 when the upstream session
//! cannot be established or is lost, 2 on invalid configuration.

use clap::Parser;
use n8n_mcp_bridge::lifecycle::{self, LifecycleController};
use n8n_mcp_bridge::types::{Config, DEFAULT_ENDPOINT};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "n8n-mcp-bridge", version, about)]
struct Cli {
    /// n8n webhook receiving the action payloads.
    #[arg(long, env = "N8N_WEBHOOK_URL")]
    backend_url: String,

    /// Upstream access token (a full endpoint URL with `token=` is accepted).
    #[arg(long, env = "XIAOZHI_MCP_TOKEN", hide_env_values = true)]
    token: String,

    /// Upstream MCP WebSocket endpoint.
    #[arg(long, env = "XIAOZHI_MCP_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Seconds in-flight calls may run after a termination signal.
    #[arg(long, env = "BRIDGE_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    shutdown_grace_secs: u64,

    /// Reconnect with backoff instead of exiting when the session drops.
    #[arg(long, env = "BRIDGE_RECONNECT")]
    reconnect: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(self.backend_url, self.token);
        config.upstream.endpoint = self.endpoint;
        config.upstream.reconnect = self.reconnect;
        config.shutdown.grace_period = Duration::from_secs(self.shutdown_grace_secs);
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize observability
    n8n_mcp_bridge::observability::init_tracing();

    let config = cli.into_config();
    let controller = match LifecycleController::from_config(config) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("❌ {}", e);
            return ExitCode::from(2);
        }
    };

    tracing::info!("⚙️ Configuration loaded");
    tracing::info!("🔗 Backend: {}", controller.config().backend.url);

    let cancel = CancellationToken::new();
    lifecycle::cancel_on_signal(cancel.clone());

    match controller.run(cancel).await {
        Ok(()) => {
            tracing::info!("🛑 Bridge stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
