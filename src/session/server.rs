//! Session serve loop — read frames → dispatch → write responses.
//!
//! Reading happens on the serve loop; every request runs in its own task and
//! hands its response to a single writer task, so a slow backend call never
//! blocks other invocations.

use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::bridge::InvocationBridge;
use crate::session::protocol::{self, Decoded, RpcResponse};
use crate::session::router;

/// Bounded queue between request tasks and the writer.
const OUTBOUND_CAPACITY: usize = 64;

/// How long the writer may take to flush and close after the loop ends.
const WRITER_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Why a session stopped serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The cancellation token fired (termination signal).
    Cancelled,
    /// The upstream peer closed the connection or the socket failed.
    Closed,
}

/// One live upstream connection with its request handler bound.
#[derive(Debug)]
pub struct Session<S> {
    stream: S,
    bridge: Arc<InvocationBridge>,
}

impl<S> Session<S>
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin
        + Send
        + 'static,
{
    pub fn new(stream: S, bridge: Arc<InvocationBridge>) -> Self {
        Self { stream, bridge }
    }

    /// Serve requests until `cancel` fires or the peer goes away.
    ///
    /// On cancellation no further frames are read; in-flight invocations get
    /// up to `grace` to deliver their responses before the socket is closed.
    pub async fn serve(self, cancel: CancellationToken, grace: Duration) -> SessionEnd {
        let Self { stream, bridge } = self;
        let (mut sink, mut source) = stream.split();
        let (tx, mut rx) = mpsc::channel::<Message>(OUTBOUND_CAPACITY);

        let writer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    tracing::warn!("Session write failed: {}", e);
                    return;
                }
            }
            let _ = sink.close().await;
        });
        let writer_abort = writer.abort_handle();

        let tracker = TaskTracker::new();

        let end = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionEnd::Cancelled,
                frame = source.next() => match frame {
                    None => break SessionEnd::Closed,
                    Some(Err(e)) => {
                        tracing::warn!("Session read failed: {}", e);
                        break SessionEnd::Closed;
                    }
                    Some(Ok(Message::Text(text))) => match protocol::decode(&text) {
                        Decoded::Request(request) => {
                            let bridge = bridge.clone();
                            let tx = tx.clone();
                            tracker.spawn(async move {
                                if let Some(response) = router::handle(&bridge, request).await {
                                    send_response(&tx, &response).await;
                                }
                            });
                        }
                        Decoded::Response => {
                            tracing::debug!("Ignoring response frame from peer");
                        }
                        // Never wait on the writer here, or a stalled peer would
                        // hold off cancellation.
                        Decoded::Invalid(response) => try_send_response(&tx, &response),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Upstream closed the session");
                        break SessionEnd::Closed;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!("Ignoring binary frame");
                    }
                    // Ping/pong are answered by the WebSocket layer.
                    Some(Ok(_)) => {}
                },
            }
        };

        tracker.close();
        if end == SessionEnd::Cancelled && !tracker.is_empty() {
            tracing::info!(in_flight = tracker.len(), "Waiting for in-flight invocations");
            if tokio::time::timeout(grace, tracker.wait()).await.is_err() {
                tracing::warn!(
                    abandoned = tracker.len(),
                    "Grace period elapsed, abandoning in-flight invocations"
                );
            }
        }

        drop(tx);
        if end == SessionEnd::Closed || !tracker.is_empty() {
            writer_abort.abort();
        } else if tokio::time::timeout(WRITER_FLUSH_TIMEOUT, writer).await.is_err() {
            writer_abort.abort();
        }

        end
    }
}

async fn send_response(tx: &mpsc::Sender<Message>, response: &RpcResponse) {
    match protocol::encode(response) {
        Ok(text) => {
            if tx.send(Message::text(text)).await.is_err() {
                tracing::debug!("Session writer gone, dropping response");
            }
        }
        Err(e) => tracing::error!("Response encoding failed: {}", e),
    }
}

fn try_send_response(tx: &mpsc::Sender<Message>, response: &RpcResponse) {
    match protocol::encode(response) {
        Ok(text) => match tx.try_send(Message::text(text)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Outbound queue full, dropping error response");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Session writer gone, dropping response");
            }
        },
        Err(e) => tracing::error!("Response encoding failed: {}", e),
    }
}
