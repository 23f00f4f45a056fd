use std::sync::Arc;
use tokio::sync::RwLock;

use super::Directive;
use crate::client::{ClientState, ConnectionManager, EventHandler};
use crate::types::SyncEvent;

/// Routes inbound frames to registered handlers.
///
/// The dispatch path never errors outward: malformed frames are logged and
/// discarded, the liveness probe is answered in-line, and a failing
/// handler is isolated from the rest.
pub struct MessageRouter {
    state: Arc<RwLock<ClientState>>,
    connection: Arc<ConnectionManager>,
}

impl MessageRouter {
    pub fn new(state: Arc<RwLock<ClientState>>, connection: Arc<ConnectionManager>) -> Self {
        Self { state, connection }
    }

    /// Decodes one raw text frame and fans it out.
    pub async fn route(&self, raw: &str) {
        let event = match SyncEvent::parse(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Discarding malformed frame: {} - Raw: {}", e, raw);
                return;
            }
        };

        // Transport-internal liveness probe: answer, never forward.
        if event.is_ping() {
            tracing::debug!("Liveness probe received, answering with pong");
            if let Err(e) = self.connection.send_directive(&Directive::Pong).await {
                tracing::warn!("Failed to queue pong: {}", e);
            }
            return;
        }

        // Snapshot the matching handlers and release the lock before
        // invoking: handlers may re-enter the client API.
        let handlers: Vec<EventHandler> = {
            let state = self.state.read().await;
            state
                .handlers
                .iter()
                .filter(|entry| entry.key.matches(event.topic()))
                .map(|entry| Arc::clone(&entry.handler))
                .collect()
        };

        tracing::debug!(
            "Dispatching event: type={}, handlers={}",
            event.kind,
            handlers.len()
        );

        for handler in handlers {
            if let Err(e) = handler(&event) {
                let err = crate::types::SyncError::Handler(e.to_string());
                tracing::warn!("{} (topic '{}')", err, event.topic());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{HandlerEntry, HandlerKey};
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    fn recording_entry(
        key: HandlerKey,
        label: &str,
        calls: &Arc<Mutex<Vec<String>>>,
        fail: bool,
    ) -> HandlerEntry {
        let calls = Arc::clone(calls);
        let label = label.to_string();
        HandlerEntry {
            key,
            handler: Arc::new(move |event: &SyncEvent| {
                calls.lock().unwrap().push(format!("{}:{}", label, event.kind));
                if fail {
                    Err("boom".into())
                } else {
                    Ok(())
                }
            }),
        }
    }

    fn router_with(entries: Vec<HandlerEntry>) -> (MessageRouter, Arc<ConnectionManager>) {
        let mut state = ClientState::new(BTreeSet::new());
        state.handlers = entries;
        let connection = Arc::new(ConnectionManager::new());
        let router = MessageRouter::new(Arc::new(RwLock::new(state)), Arc::clone(&connection));
        (router, connection)
    }

    #[tokio::test]
    async fn test_malformed_frames_reach_no_handler() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (router, _) = router_with(vec![recording_entry(HandlerKey::Any, "any", &calls, false)]);

        router.route("not json at all").await;
        router.route(r#"{"data":{"x":1}}"#).await;

        assert!(calls.lock().unwrap().is_empty());

        // The dispatch path is still alive afterwards.
        router.route(r#"{"type":"job.analyzed"}"#).await;
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ping_answered_and_not_forwarded() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (router, connection) =
            router_with(vec![recording_entry(HandlerKey::Any, "any", &calls, false)]);

        let (tx, mut rx) = mpsc::channel(8);
        connection.set_writer(tx).await;

        router.route(r#"{"type":"system.ping"}"#).await;

        assert_eq!(rx.recv().await.unwrap(), r#"{"action":"pong"}"#);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prefix_and_wildcard_dispatch_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (router, _) = router_with(vec![
            recording_entry(HandlerKey::Topic("jobs".to_string()), "h1", &calls, true),
            recording_entry(HandlerKey::Topic("jobs".to_string()), "h2", &calls, false),
            recording_entry(
                HandlerKey::Topic("applications".to_string()),
                "apps",
                &calls,
                false,
            ),
            recording_entry(HandlerKey::Any, "any", &calls, false),
        ]);

        router
            .route(r#"{"type":"job.analyzed","data":{"match_score":85},"timestamp":"2024-01-01T00:00:00Z"}"#)
            .await;

        // The failing h1 does not suppress h2; the applications handler
        // does not fire.
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "h1:job.analyzed".to_string(),
                "h2:job.analyzed".to_string(),
                "any:job.analyzed".to_string(),
            ]
        );
    }
}
