use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::constants::SYSTEM_PING;

/// An inbound event frame.
///
/// Wire shape: `{"type":"<topic>.<action>","data":<payload>,"timestamp":"<ISO-8601>"}`.
/// The payload is opaque to the client; only `type` is interpreted, split
/// into a topic prefix and an action suffix at the first `.`. The server
/// timestamp is kept verbatim but not trusted for ordering; `received_at`
/// is stamped locally at decode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl SyncEvent {
    /// Decode a raw text frame into an event, stamping `received_at`.
    pub fn parse(raw: &str) -> crate::types::Result<Self> {
        let event: Self = serde_json::from_str(raw)?;
        Ok(event)
    }

    /// Topic prefix: everything before the first `.`, or the whole type
    /// string when there is no dot.
    pub fn topic(&self) -> &str {
        self.kind
            .split_once('.')
            .map_or(self.kind.as_str(), |(topic, _)| topic)
    }

    /// Action suffix: everything after the first `.`, empty when absent.
    pub fn action(&self) -> &str {
        self.kind.split_once('.').map_or("", |(_, action)| action)
    }

    /// Whether this is the transport-internal liveness probe.
    pub fn is_ping(&self) -> bool {
        self.kind == SYSTEM_PING
    }
}
