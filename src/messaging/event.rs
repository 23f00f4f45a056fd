use serde::{Deserialize, Serialize};

/// Outbound control frames (client → server).
///
/// Subscription membership changes are communicated in-band over the live
/// connection; only the initial channel set rides on the connect URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Directive {
    /// Start delivery for a topic.
    Subscribe { channel: String },
    /// Stop delivery for a topic. Fire-and-forget: the client does not
    /// wait for the server to acknowledge.
    Unsubscribe { channel: String },
    /// Reply to the server's `system.ping` liveness probe.
    Pong,
}

impl Directive {
    pub fn subscribe(channel: impl Into<String>) -> Self {
        Self::Subscribe {
            channel: channel.into(),
        }
    }

    pub fn unsubscribe(channel: impl Into<String>) -> Self {
        Self::Unsubscribe {
            channel: channel.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_wire_format() {
        let json = serde_json::to_string(&Directive::subscribe("jobs")).unwrap();
        assert_eq!(json, r#"{"action":"subscribe","channel":"jobs"}"#);
    }

    #[test]
    fn test_unsubscribe_wire_format() {
        let json = serde_json::to_string(&Directive::unsubscribe("interviews")).unwrap();
        assert_eq!(json, r#"{"action":"unsubscribe","channel":"interviews"}"#);
    }

    #[test]
    fn test_pong_wire_format() {
        let json = serde_json::to_string(&Directive::Pong).unwrap();
        assert_eq!(json, r#"{"action":"pong"}"#);
    }

    #[test]
    fn test_directive_round_trip() {
        let directive = Directive::subscribe("applications");
        let json = serde_json::to_string(&directive).unwrap();
        assert_eq!(serde_json::from_str::<Directive>(&json).unwrap(), directive);
    }
}
