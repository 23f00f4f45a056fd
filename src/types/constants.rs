/// Reserved event type for the server's liveness probe. Answered with a
/// pong directive and never forwarded to handlers.
pub const SYSTEM_PING: &str = "system.ping";

/// Path segment appended to the base address for the push channel.
pub const CHANNEL_PATH: &str = "ws";

/// Query parameter carrying the caller identity.
pub const PARAM_USER_ID: &str = "user_id";

/// Query parameter carrying the comma-joined initial channel set.
pub const PARAM_CHANNELS: &str = "channels";

/// Default reconnect attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default backoff base delay (milliseconds).
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Default backoff ceiling (milliseconds).
pub const DEFAULT_CAP_DELAY_MS: u64 = 10_000;

/// Outbound frame queue depth per connection.
pub const OUTBOUND_BUFFER_SIZE: usize = 64;

/// Inbound transport event queue depth per connection.
pub const INBOUND_BUFFER_SIZE: usize = 64;
