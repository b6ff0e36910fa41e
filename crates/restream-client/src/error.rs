//! Error types for the broadcast binding.

use restream_ipc::EngineFailure;
use thiserror::Error;

/// Ways a single request/reply round trip can fail.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Engine side of the channel is gone.
    #[error("Engine disconnected")]
    Disconnected,

    /// Engine dropped the request without replying.
    #[error("Engine dropped the request without replying")]
    ReplyDropped,

    /// Engine rejected the request.
    #[error("Engine rejected the request: {0}")]
    Rejected(#[from] EngineFailure),
}

/// An external broadcast operation failed.
///
/// The underlying [`ChannelError`] is kept unchanged as the source.
#[derive(Debug, Error)]
#[error("{method} for broadcast {id} failed")]
pub struct BroadcastError {
    method: &'static str,
    id: i64,
    #[source]
    source: ChannelError,
}

impl BroadcastError {
    pub(crate) fn new(method: &'static str, id: i64, source: ChannelError) -> Self {
        Self { method, id, source }
    }

    /// Method name of the failed request.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Session id the request targeted.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The channel failure as reported.
    pub fn channel_error(&self) -> &ChannelError {
        &self.source
    }

    /// Consume the error, returning the channel failure.
    pub fn into_channel_error(self) -> ChannelError {
        self.source
    }
}
