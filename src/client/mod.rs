pub mod builder;
pub mod connection;
pub mod core;
pub mod state;

pub use builder::{LifecycleHook, SyncClientBuilder, SyncClientOptions};
pub use connection::{ConnectionManager, ConnectionState};
pub use core::SyncClient;
pub use state::{ClientState, EventHandler, HandlerEntry, HandlerKey, HandlerResult};
