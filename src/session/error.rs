use thiserror::Error;

/// Fatal session errors — anything here ends the current connection and is
/// handed back to the Supervisor for backoff-and-retry (§7).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("handshake request build error: {0}")]
    Handshake(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to send frame: {0}")]
    Send(String),
}
