use crate::types::SyncEvent;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of a consumer handler invocation. Failures are logged and
/// isolated; they never tear down the connection.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A registered consumer callback.
pub type EventHandler = Arc<dyn Fn(&SyncEvent) -> HandlerResult + Send + Sync>;

/// What a handler is registered under: a topic prefix or the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKey {
    /// Receives every event.
    Any,
    /// Receives events whose type prefix matches the registered name.
    Topic(String),
}

impl HandlerKey {
    /// Whether an event with the given topic prefix should reach this
    /// handler. Channel names are plural topic-family names (`jobs`) while
    /// event types carry the singular entity (`job.analyzed`), so a
    /// trailing plural `s` on the registered name is tolerated.
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Topic(name) => name == topic || name.strip_suffix('s') == Some(topic),
        }
    }

    /// Whether this handler belongs to the given channel, for the
    /// optimistic handler drop on unsubscribe. The wildcard belongs to no
    /// channel.
    pub fn is_for_channel(&self, channel: &str) -> bool {
        match self {
            Self::Any => false,
            Self::Topic(name) => name == channel || channel.strip_suffix('s') == Some(name.as_str()),
        }
    }
}

/// One entry in the ordered handler registry.
pub struct HandlerEntry {
    pub key: HandlerKey,
    pub handler: EventHandler,
}

/// Consolidated mutable state for a [`SyncClient`](super::SyncClient).
/// Using a single struct reduces lock contention.
pub struct ClientState {
    /// Desired channel set. Survives reconnects; re-asserted on every open.
    pub channels: BTreeSet<String>,

    /// Handler registry in registration order.
    pub handlers: Vec<HandlerEntry>,

    /// Consecutive failed open attempts since the last successful open.
    pub attempt_count: u32,

    /// Set once by `dispose()`; guards against a reconnect firing after
    /// disposal.
    pub disposed: bool,
}

impl ClientState {
    pub fn new(channels: BTreeSet<String>) -> Self {
        Self {
            channels,
            handlers: Vec::new(),
            attempt_count: 0,
            disposed: false,
        }
    }
}
