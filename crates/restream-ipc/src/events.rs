//! Events published by the engine.

use serde::{Deserialize, Serialize};

use crate::reply::EngineFailure;
use crate::state::SessionState;

/// Events that the engine can publish to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BroadcastEvent {
    /// A session changed state.
    StateChanged {
        /// Session id.
        id: i64,

        /// Previous state, `None` for a freshly created session.
        previous: Option<SessionState>,

        /// Current state.
        current: SessionState,
    },

    /// A request was rejected.
    Rejected {
        id: i64,
        method: String,
        failure: EngineFailure,
    },

    /// Engine is ready to accept requests.
    Ready,

    /// Engine has shut down.
    Shutdown,
}
