pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{Result, SyncError};
pub use message::SyncEvent;
