//! Log output for the bridge process.
//!
//! Everything goes to stderr so a supervisor can capture it separately from
//! anything the process prints on stdout. Invocation spans carry the call id
//! and action name; `BRIDGE_LOG_FORMAT=json` makes them machine-readable.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the process-wide subscriber. Later calls are no-ops.
///
/// `RUST_LOG` narrows or widens the filter (`info` when unset); set it to
/// `n8n_mcp_bridge=debug` to see ignored arguments and notifications.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var("BRIDGE_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
