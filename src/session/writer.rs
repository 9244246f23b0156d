//! Single-writer actor (§5 "single-writer invariant"): one task owns the
//! transport's write half; every other activity reaches it through an mpsc
//! channel. Grounded in the teacher's `let (mut write, mut read) =
//! ws_stream.split()` split — the teacher only ever writes from the
//! subscribe call, so this channel-fed actor is new plumbing for the case
//! where three independent activities need to share one write half.

use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::warn;

use super::error::SessionError;

#[derive(Clone)]
pub struct Writer {
    tx: mpsc::Sender<Message>,
}

impl Writer {
    /// Spawns the writer task over `sink` and returns a cheaply-cloneable
    /// handle plus the task's join handle (awaited during teardown).
    pub fn spawn<S>(mut sink: S) -> (Self, JoinHandle<()>)
    where
        S: Sink<Message> + Unpin + Send + 'static,
        S::Error: std::fmt::Display,
    {
        let (tx, mut rx) = mpsc::channel::<Message>(128);

        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    warn!(error = %e, "writer send failed, closing transport");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        (Self { tx }, handle)
    }

    pub async fn send_json(&self, value: &serde_json::Value) -> Result<(), SessionError> {
        self.tx
            .send(Message::Text(value.to_string()))
            .await
            .map_err(|e| SessionError::Send(e.to_string()))
    }
}
