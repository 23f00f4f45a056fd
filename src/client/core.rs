use std::sync::Arc;
use tokio::sync::{RwLock, watch};

use super::state::{ClientState, HandlerEntry, HandlerKey, HandlerResult};
use super::{ConnectionManager, ConnectionState, LifecycleHook, SyncClientBuilder, SyncClientOptions};
use crate::infrastructure::Backoff;
use crate::messaging::{Directive, MessageRouter};
use crate::transport::{Transport, TransportEvent, TransportLink, WebSocketTransport};
use crate::types::{Result, SyncError, SyncEvent};

/// The resilient channel client.
///
/// `SyncClient` owns one push-channel connection, keeps it alive through
/// network instability with exponential-backoff reconnection, re-asserts
/// its channel subscriptions on every successful open, and fans inbound
/// events out to handlers keyed by topic prefix. When the retry budget is
/// exhausted it parks in a terminal disabled state instead of spinning.
///
/// # Example
///
/// ```no_run
/// use livesync::{SyncClient, SyncClientOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SyncClient::new(
///         "wss://api.example.com",
///         SyncClientOptions {
///             identity: "user-42".to_string(),
///             channels: vec!["jobs".to_string(), "applications".to_string()],
///             ..Default::default()
///         },
///     )?;
///
///     client
///         .on("jobs", |event| {
///             println!("job event: {} {:?}", event.kind, event.data);
///             Ok(())
///         })
///         .await;
///
///     // ... the client connects eagerly and keeps itself alive ...
///     client.dispose().await;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct SyncClient {
    pub(crate) url: String,
    pub(crate) max_attempts: u32,
    pub(crate) backoff: Backoff,
    pub(crate) on_connect: Option<LifecycleHook>,
    pub(crate) on_disconnect: Option<LifecycleHook>,
    pub(crate) on_disabled: Option<LifecycleHook>,

    pub(crate) connection: Arc<ConnectionManager>,
    pub(crate) state: Arc<RwLock<ClientState>>,
    pub(crate) transport: Arc<dyn Transport>,

    pub(crate) state_tx: watch::Sender<ConnectionState>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl SyncClient {
    /// Creates a client over the production WebSocket transport and starts
    /// connecting immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] or [`SyncError::UrlParse`] for
    /// bad construction input. Nothing past construction errors to the
    /// caller.
    pub fn new(endpoint: impl Into<String>, options: SyncClientOptions) -> Result<Self> {
        Self::with_transport(endpoint, options, Arc::new(WebSocketTransport))
    }

    /// Creates a client over an injected transport. This is the seam the
    /// test suite uses to drive the full lifecycle deterministically.
    pub fn with_transport(
        endpoint: impl Into<String>,
        options: SyncClientOptions,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        SyncClientBuilder::new(endpoint, options).map(|builder| builder.build(transport))
    }

    /// Registers a handler for events whose topic prefix matches `topic`.
    /// Handlers fire in registration order; a failing handler is logged
    /// and isolated.
    pub async fn on<F>(&self, topic: impl Into<String>, handler: F)
    where
        F: Fn(&SyncEvent) -> HandlerResult + Send + Sync + 'static,
    {
        let entry = HandlerEntry {
            key: HandlerKey::Topic(topic.into()),
            handler: Arc::new(handler),
        };
        self.state.write().await.handlers.push(entry);
    }

    /// Registers a wildcard handler that receives every delivered event.
    pub async fn on_any<F>(&self, handler: F)
    where
        F: Fn(&SyncEvent) -> HandlerResult + Send + Sync + 'static,
    {
        let entry = HandlerEntry {
            key: HandlerKey::Any,
            handler: Arc::new(handler),
        };
        self.state.write().await.handlers.push(entry);
    }

    /// Adds a channel to the desired set. If the connection is open the
    /// subscribe directive goes out immediately; otherwise the channel
    /// rides along on the next open-transition re-assertion. Idempotent.
    pub async fn subscribe(&self, channel: impl Into<String>) {
        let channel = channel.into();
        if channel.is_empty() {
            tracing::warn!("Ignoring subscribe with empty channel name");
            return;
        }

        let added = self.state.write().await.channels.insert(channel.clone());
        if !added {
            tracing::debug!("Already subscribed to '{}'", channel);
            return;
        }

        if self.connection.is_connected().await
            && let Err(e) = self
                .connection
                .send_directive(&Directive::subscribe(channel))
                .await
        {
            tracing::warn!("Failed to queue subscribe directive: {}", e);
        }
    }

    /// Removes a channel from the desired set, optimistically dropping the
    /// handlers registered under it in the same call. Does not wait for
    /// the server to acknowledge. Idempotent.
    pub async fn unsubscribe(&self, channel: &str) {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state.channels.remove(channel);
            if removed {
                state.handlers.retain(|entry| !entry.key.is_for_channel(channel));
            }
            removed
        };
        if !removed {
            tracing::debug!("Not subscribed to '{}', nothing to do", channel);
            return;
        }

        if self.connection.is_connected().await
            && let Err(e) = self
                .connection
                .send_directive(&Directive::unsubscribe(channel))
                .await
        {
            tracing::warn!("Failed to queue unsubscribe directive: {}", e);
        }
    }

    /// Serializes and transmits a payload, only while the connection is
    /// open. Calls in any other state are silently dropped, never queued:
    /// the channel is a notification signal, not a reliable command path.
    pub async fn send(&self, data: serde_json::Value) {
        if !self.connection.is_connected().await {
            tracing::debug!("Not connected, dropping outbound payload");
            return;
        }
        match serde_json::to_string(&data) {
            Ok(json) => self.connection.send_frame(json).await,
            Err(e) => tracing::warn!("Failed to serialize outbound payload: {}", e),
        }
    }

    /// Tears the client down: cancels any pending reconnect, closes the
    /// transport, and schedules nothing further. Idempotent and safe on an
    /// already-closed or disabled client.
    pub async fn dispose(&self) {
        {
            let mut state = self.state.write().await;
            if state.disposed {
                tracing::debug!("Client already disposed");
                return;
            }
            state.disposed = true;
        }

        self.shutdown_tx.send_replace(true);
        self.connection.close().await;
        self.state_tx.send_replace(ConnectionState::Closed);
        tracing::info!("Channel client disposed");
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.connection.state().await
    }

    /// Whether the connection is currently open. Advisory: consumers
    /// should keep showing last-known data while this is false and the
    /// client reconnects.
    pub async fn is_connected(&self) -> bool {
        self.connection.is_connected().await
    }

    /// Whether the retry budget is exhausted. Once true, the client will
    /// not retry on its own; manual re-construction is required.
    pub async fn is_disabled(&self) -> bool {
        self.connection.state().await == ConnectionState::Disabled
    }

    /// A watch feed of connection state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    async fn set_state(&self, new_state: ConnectionState) {
        self.connection.set_state(new_state).await;
        self.state_tx.send_replace(new_state);
    }

    async fn is_disposed(&self) -> bool {
        self.state.read().await.disposed
    }

    /// Supervisor loop. Exactly one instance runs per client; it owns the
    /// whole connection lifecycle, so there is never more than one live
    /// link at a time.
    pub(crate) async fn run(self) {
        let mut shutdown = self.shutdown_tx.subscribe();

        loop {
            if self.is_disposed().await {
                break;
            }

            self.set_state(ConnectionState::Connecting).await;
            tracing::info!("Connecting to {}", self.url);

            let connect = tokio::select! {
                _ = shutdown.changed() => break,
                result = self.transport.connect(&self.url) => result,
            };

            match connect {
                Ok(link) => {
                    self.connection.set_writer(link.outbound.clone()).await;
                    self.on_open().await;
                    let shut = self.pump(link, &mut shutdown).await;
                    self.connection.clear_writer().await;
                    if shut || self.is_disposed().await {
                        break;
                    }
                    self.set_state(ConnectionState::Closed).await;
                    if let Some(hook) = &self.on_disconnect {
                        hook();
                    }
                }
                Err(e) => {
                    tracing::warn!("Connection attempt failed: {}", e);
                    self.set_state(ConnectionState::Closed).await;
                    let failures = {
                        let mut state = self.state.write().await;
                        state.attempt_count += 1;
                        state.attempt_count
                    };
                    if failures >= self.max_attempts {
                        let err = SyncError::RetryBudgetExhausted { attempts: failures };
                        tracing::warn!("{}; manual restart required", err);
                        self.set_state(ConnectionState::Disabled).await;
                        if let Some(hook) = &self.on_disabled {
                            hook();
                        }
                        break;
                    }
                }
            }

            if self.is_disposed().await {
                break;
            }

            let failures = self.state.read().await.attempt_count;
            let delay = self.backoff.delay(failures.saturating_sub(1));
            tracing::info!(
                "Reconnecting in {:?} (failed attempts: {}/{})",
                delay,
                failures,
                self.max_attempts
            );
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::debug!("Supervisor finished");
    }

    /// Open-transition side effects: a successful open fully forgives
    /// prior failure history, then the desired set is re-asserted in full.
    async fn on_open(&self) {
        self.state.write().await.attempt_count = 0;
        self.set_state(ConnectionState::Open).await;
        tracing::info!("Channel connection open");

        self.reassert_channels().await;

        if let Some(hook) = &self.on_connect {
            hook();
        }
    }

    /// Issues a subscribe directive for every channel in the desired set.
    /// Subscriptions are idempotent at the server, so order only affects
    /// latency.
    async fn reassert_channels(&self) {
        let channels: Vec<String> = self.state.read().await.channels.iter().cloned().collect();
        for channel in channels {
            tracing::debug!("Re-asserting subscription to '{}'", channel);
            if let Err(e) = self
                .connection
                .send_directive(&Directive::subscribe(channel))
                .await
            {
                tracing::warn!("Failed to queue subscribe directive: {}", e);
            }
        }
    }

    /// Drains one link until it dies or shutdown fires. Returns whether
    /// shutdown ended the pump.
    async fn pump(&self, mut link: TransportLink, shutdown: &mut watch::Receiver<bool>) -> bool {
        let router = MessageRouter::new(Arc::clone(&self.state), Arc::clone(&self.connection));

        loop {
            tokio::select! {
                _ = shutdown.changed() => return true,
                event = link.inbound.recv() => match event {
                    Some(TransportEvent::Message(text)) => router.route(&text).await,
                    Some(TransportEvent::Closed(reason)) => {
                        match reason {
                            Some(reason) => tracing::warn!("Connection lost: {}", reason),
                            None => tracing::info!("Server closed the connection"),
                        }
                        return false;
                    }
                    None => {
                        tracing::info!("Transport link ended");
                        return false;
                    }
                },
            }
        }
    }

    /// Registered handler count, across all keys.
    pub async fn handler_count(&self) -> usize {
        self.state.read().await.handlers.len()
    }

    /// Snapshot of the desired channel set.
    pub async fn channels(&self) -> Vec<String> {
        self.state.read().await.channels.iter().cloned().collect()
    }
}
