use crate::messaging::Directive;
use crate::types::Result;
use tokio::sync::{RwLock, mpsc};

/// Connection lifecycle states.
///
/// `Disabled` is terminal: it is reached only from `Closed` once the retry
/// budget is exhausted, and nothing inside the client leaves it. Only
/// re-construction by the caller resumes service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
    Disabled,
}

/// Owns the outbound half of the live transport link plus the connection
/// state. There is at most one live link at a time; the client never
/// exposes it to consumers.
pub struct ConnectionManager {
    outbound: RwLock<Option<mpsc::Sender<String>>>,
    state: RwLock<ConnectionState>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            outbound: RwLock::new(None),
            state: RwLock::new(ConnectionState::Idle),
        }
    }

    /// Installs the outbound sender of a freshly opened link.
    pub async fn set_writer(&self, writer: mpsc::Sender<String>) {
        let mut outbound = self.outbound.write().await;
        *outbound = Some(writer);
    }

    /// Drops the outbound sender, which asks the transport to close the
    /// link.
    pub async fn clear_writer(&self) {
        let mut outbound = self.outbound.write().await;
        *outbound = None;
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn set_state(&self, new_state: ConnectionState) {
        let mut state = self.state.write().await;
        *state = new_state;
    }

    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Open
    }

    /// Queues a raw frame on the live link. Frames are dropped, not
    /// queued, when no link is up.
    pub async fn send_frame(&self, frame: String) {
        let outbound = self.outbound.read().await;
        match outbound.as_ref() {
            Some(writer) => {
                if writer.send(frame).await.is_err() {
                    tracing::debug!("Outbound link gone, frame dropped");
                }
            }
            None => tracing::debug!("No live connection, frame dropped"),
        }
    }

    /// Serializes and queues a control directive.
    pub async fn send_directive(&self, directive: &Directive) -> Result<()> {
        let json = serde_json::to_string(directive)?;
        self.send_frame(json).await;
        Ok(())
    }

    /// Closes the link without scheduling anything further.
    pub async fn close(&self) {
        self.set_state(ConnectionState::Closing).await;
        self.clear_writer().await;
        self.set_state(ConnectionState::Closed).await;
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
