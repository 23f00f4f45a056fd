use thiserror::Error;

/// Errors that can occur inside the channel client.
///
/// Everything except the construction-time variants is recovered
/// internally: transport failures feed the reconnect policy, malformed
/// frames are dropped, handler failures are isolated. Callers only ever
/// see errors from [`SyncClientBuilder::new`](crate::client::SyncClientBuilder::new).
#[derive(Error, Debug)]
pub enum SyncError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// General connection failure with descriptive message
    #[error("connection error: {0}")]
    Connection(String),

    /// Inbound frame could not be decoded into the event envelope
    #[error("malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    /// A registered consumer handler failed
    #[error("handler error: {0}")]
    Handler(String),

    /// All reconnect attempts consumed; the client is disabled
    #[error("retry budget exhausted after {attempts} attempts")]
    RetryBudgetExhausted { attempts: u32 },

    /// Invalid construction input (empty identity, blank channel name, ...)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error (malformed base address)
    #[error("url parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Convenience type alias for `Result<T, SyncError>`.
pub type Result<T> = std::result::Result<T, SyncError>;
