//! Engine-side session states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one broadcast session, as tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Session exists but is not restreaming.
    Created,

    /// Session is restreaming.
    Started,

    /// Session resources have been released.
    Disposed,
}

impl SessionState {
    /// Returns true if the session is restreaming.
    pub fn is_started(self) -> bool {
        matches!(self, Self::Started)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Started => "Started",
            Self::Disposed => "Disposed",
        }
    }
}
