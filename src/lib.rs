//! # n8n MCP Bridge
//!
//! Exposes one MCP tool to a voice-assistant platform and relays every call
//! to an n8n automation webhook:
//! - Tool catalog advertised over `tools/list`
//! - Typed validation of `tools/call` arguments
//! - One bounded-time HTTP POST per invocation, folded into a response envelope
//! - Upstream WebSocket session with pluggable connection strategy
//! - Signal-driven shutdown with a bounded grace period
//!
//! ## Architecture
//!
//! ```text
//!   assistant platform                                         n8n
//!          │  JSON-RPC over WebSocket                           ▲
//!          ▼                                                    │ POST (10s deadline)
//!   ┌──────────────┐   ┌────────────┐   ┌───────────────────┐   │
//!   │   Session    │──►│   Router   │──►│ InvocationBridge  │───┘
//!   │ (serve loop) │   └────────────┘   │  ToolCatalog      │
//!   └──────────────┘                    └───────────────────┘
//!          ▲
//!   LifecycleController (connect, cancel on signal, grace period)
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod bridge;
pub mod lifecycle;
pub mod session;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
