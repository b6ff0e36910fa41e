//! Typed messages for the restream binding.
//!
//! This crate defines the values that cross the boundary between the
//! broadcast binding and the media engine: configuration, media references,
//! requests, replies and engine events.

mod events;
mod reply;
mod requests;
mod state;
mod types;

pub use events::BroadcastEvent;
pub use reply::{EngineFailure, EngineReply, FailureCode};
pub use requests::{EngineRequest, METHOD_CREATE, METHOD_DISPOSE, METHOD_START};
pub use state::SessionState;
pub use types::{BroadcastConfiguration, Media, MediaType, Payload};

use crossbeam_channel::{Receiver, Sender};
use tokio::sync::oneshot;

/// Channel capacity for requests (binding → engine).
pub const REQUEST_CHANNEL_CAPACITY: usize = 64;

/// Channel capacity for events (engine → observers).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A request paired with the slot its reply is delivered to.
#[derive(Debug)]
pub struct Envelope {
    pub request: EngineRequest,
    pub reply_tx: oneshot::Sender<EngineReply>,
}

impl Envelope {
    /// Wrap a request, returning the envelope and the reply receiver.
    pub fn new(request: EngineRequest) -> (Self, oneshot::Receiver<EngineReply>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        (Self { request, reply_tx }, reply_rx)
    }
}

/// Creates a bounded request channel.
pub fn request_channel() -> (Sender<Envelope>, Receiver<Envelope>) {
    crossbeam_channel::bounded(REQUEST_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<BroadcastEvent>, Receiver<BroadcastEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
