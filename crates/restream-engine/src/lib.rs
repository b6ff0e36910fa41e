//! Loopback media engine for the restream binding.
//!
//! The engine serves the request channel on its own thread, keeps a table
//! of broadcast sessions keyed by id and acknowledges or rejects each
//! request. It performs no media work; it stands in for the native engine.

mod metrics;
mod orchestrator;
mod state;

pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use orchestrator::{Engine, EngineHandle};
pub use state::{SessionRecord, SessionRegistry};

use crossbeam_channel::{Receiver, Sender};
use restream_ipc::{BroadcastEvent, Envelope};

/// Create an engine instance with IPC channels.
pub fn create_engine(request_rx: Receiver<Envelope>, event_tx: Sender<BroadcastEvent>) -> Engine {
    Engine::new(request_rx, event_tx)
}
