//! Core types for the bridge.
//!
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Immutable configuration for the backend, upstream session and shutdown

mod config;
mod errors;

pub use config::{
    BackendConfig, Config, ShutdownConfig, UpstreamConfig, DEFAULT_ENDPOINT, DEFAULT_ORIGIN,
};
pub use errors::{rpc_code, Error, Result};
