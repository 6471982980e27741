//! Upstream session — JSON-RPC over a WebSocket connection.
//!
//! The assistant platform is the JSON-RPC *client*: it sends `initialize`,
//! `tools/list` and `tools/call` down the socket this bridge dialed, and the
//! bridge answers on the same socket.

pub mod protocol;
pub mod router;
pub mod server;

pub use server::{Session, SessionEnd};

use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Client-side WebSocket stream to the upstream endpoint.
pub type UpstreamStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
