use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use url::Url;

use super::{ClientState, ConnectionManager, ConnectionState, SyncClient};
use crate::client::state::EventHandler;
use crate::infrastructure::Backoff;
use crate::transport::Transport;
use crate::types::constants::{
    CHANNEL_PATH, DEFAULT_BASE_DELAY_MS, DEFAULT_CAP_DELAY_MS, DEFAULT_MAX_ATTEMPTS,
    PARAM_CHANNELS, PARAM_USER_ID,
};
use crate::types::{Result, SyncError};

/// A fire-and-forget lifecycle hook.
pub type LifecycleHook = Arc<dyn Fn() + Send + Sync>;

/// Construction options for [`SyncClient`].
#[derive(Clone, Default)]
pub struct SyncClientOptions {
    /// Caller identity, carried on the connect URL. Required.
    pub identity: String,
    /// Initial desired channel set. Duplicates are deduplicated silently.
    pub channels: Vec<String>,
    /// Reconnect attempt budget. Default 5.
    pub max_attempts: Option<u32>,
    /// Backoff base delay. Default 1s.
    pub base_delay: Option<Duration>,
    /// Backoff ceiling. Default 10s.
    pub cap_delay: Option<Duration>,
    /// Global handler invoked for every delivered event.
    pub on_message: Option<EventHandler>,
    /// Fired each time the connection reaches `Open`.
    pub on_connect: Option<LifecycleHook>,
    /// Fired each time an open connection is lost.
    pub on_disconnect: Option<LifecycleHook>,
    /// Fired once when the retry budget is exhausted.
    pub on_disabled: Option<LifecycleHook>,
}

/// Validating builder for [`SyncClient`].
///
/// All construction errors surface here; past `build()` the public API is
/// infallible.
pub struct SyncClientBuilder {
    url: String,
    channels: BTreeSet<String>,
    options: SyncClientOptions,
}

impl std::fmt::Debug for SyncClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClientBuilder")
            .field("url", &self.url)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl SyncClientBuilder {
    /// Validates the inputs and derives the connect URL. The URL reflects
    /// the *initial* channel set only; later membership changes go
    /// in-band.
    pub fn new(endpoint: impl Into<String>, options: SyncClientOptions) -> Result<Self> {
        let endpoint = endpoint.into();

        if endpoint.is_empty() {
            return Err(SyncError::InvalidConfig("base address is required".to_string()));
        }
        if options.identity.is_empty() {
            return Err(SyncError::InvalidConfig("identity is required".to_string()));
        }
        if options.channels.iter().any(|c| c.is_empty()) {
            return Err(SyncError::InvalidConfig(
                "channel names must be non-empty".to_string(),
            ));
        }

        let channels: BTreeSet<String> = options.channels.iter().cloned().collect();
        let url = build_channel_url(&endpoint, &options.identity, &channels)?;

        Ok(Self {
            url,
            channels,
            options,
        })
    }

    /// Builds the client and starts its supervisor. The client connects
    /// eagerly and schedules its own retries from here on.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self, transport: Arc<dyn Transport>) -> SyncClient {
        let mut state = ClientState::new(self.channels);
        if let Some(on_message) = self.options.on_message.clone() {
            state.handlers.push(super::HandlerEntry {
                key: super::HandlerKey::Any,
                handler: on_message,
            });
        }

        let (state_tx, _state_rx) = watch::channel(ConnectionState::Idle);
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);

        let backoff = Backoff::new(
            self.options
                .base_delay
                .unwrap_or(Duration::from_millis(DEFAULT_BASE_DELAY_MS)),
            self.options
                .cap_delay
                .unwrap_or(Duration::from_millis(DEFAULT_CAP_DELAY_MS)),
        );

        let client = SyncClient {
            url: self.url,
            max_attempts: self.options.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            backoff,
            on_connect: self.options.on_connect.clone(),
            on_disconnect: self.options.on_disconnect.clone(),
            on_disabled: self.options.on_disabled.clone(),
            connection: Arc::new(ConnectionManager::new()),
            state: Arc::new(RwLock::new(state)),
            transport,
            state_tx,
            shutdown_tx,
        };

        let supervisor = client.clone();
        tokio::spawn(async move {
            supervisor.run().await;
        });

        client
    }
}

/// `<base>/ws?user_id=<identity>&channels=<comma-separated initial set>`
fn build_channel_url(endpoint: &str, identity: &str, channels: &BTreeSet<String>) -> Result<String> {
    let mut url = Url::parse(endpoint)?;
    url.path_segments_mut()
        .map_err(|()| SyncError::InvalidConfig("base address cannot be opaque".to_string()))?
        .pop_if_empty()
        .push(CHANNEL_PATH);

    let joined = channels.iter().cloned().collect::<Vec<_>>().join(",");
    url.query_pairs_mut()
        .append_pair(PARAM_USER_ID, identity)
        .append_pair(PARAM_CHANNELS, &joined);

    Ok(url.to_string())
}
