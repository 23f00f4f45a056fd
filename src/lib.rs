//! # livesync
//!
//! A resilient realtime channel client: one long-lived push-channel
//! connection that survives network instability, re-establishes itself
//! without operator intervention, multiplexes independent topic
//! subscriptions over a single transport, and fans incoming server events
//! out to registered consumers.
//!
//! ## Example
//!
//! ```no_run
//! use livesync::{SyncClient, SyncClientOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SyncClient::new(
//!         "wss://api.example.com",
//!         SyncClientOptions {
//!             identity: "user-42".to_string(),
//!             channels: vec!["jobs".to_string()],
//!             ..Default::default()
//!         },
//!     )?;
//!
//!     client
//!         .on("jobs", |event| {
//!             println!("invalidate: {}", event.kind);
//!             Ok(())
//!         })
//!         .await;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod transport;
pub mod types;

pub use client::{
    ConnectionState, HandlerResult, LifecycleHook, SyncClient, SyncClientBuilder, SyncClientOptions,
};
pub use infrastructure::Backoff;
pub use messaging::Directive;
pub use transport::{Transport, TransportEvent, TransportLink, WebSocketTransport};
pub use types::{Result, SyncError, SyncEvent};
