//! Broadcast binding for the restream media engine.
//!
//! A [`Broadcast`] is a handle for one restreaming session. Each lifecycle
//! operation sends a single request through an [`EngineChannel`] and waits
//! for the engine's acknowledgement. All media work happens engine-side.

mod broadcast;
mod channel;
mod error;

pub use broadcast::Broadcast;
pub use channel::{EngineChannel, EngineClient};
pub use error::{BroadcastError, ChannelError};

pub use restream_ipc::{BroadcastConfiguration, Media, MediaType};

/// Result type for broadcast operations.
pub type BroadcastResult<T> = Result<T, BroadcastError>;
