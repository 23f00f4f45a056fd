use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::Result;

pub mod websocket;

pub use websocket::WebSocketTransport;

/// Events surfaced by a live transport link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete inbound text frame.
    Message(String),
    /// The link is gone (server close, network error). The reason, when
    /// present, is for logging only.
    Closed(Option<String>),
}

/// A live bidirectional link produced by a successful connect.
///
/// Frames queued on `outbound` go to the wire in order; dropping the
/// sender asks the transport to close the link gracefully. The end of
/// `inbound` means the link is fully dead.
pub struct TransportLink {
    pub outbound: mpsc::Sender<String>,
    pub inbound: mpsc::Receiver<TransportEvent>,
}

/// The injected socket capability.
///
/// Production code wires [`WebSocketTransport`]; tests inject a scripted
/// fake, which is what makes the whole client lifecycle drivable under
/// deterministic virtual time. Establishment timeouts are the
/// implementation's concern.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Opens a new link. `Ok` corresponds to the transport-open
    /// notification.
    async fn connect(&self, url: &str) -> Result<TransportLink>;
}
