//! Session table.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use restream_ipc::{BroadcastConfiguration, EngineFailure, FailureCode, Payload, SessionState};

/// Everything the engine keeps for one session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Media reference as received.
    pub media: Payload,

    /// Decoded configuration.
    pub configuration: BroadcastConfiguration,

    /// Current lifecycle state.
    pub state: SessionState,
}

/// Live sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, SessionRecord>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session in the `Created` state.
    pub fn insert(
        &self,
        id: i64,
        media: Payload,
        configuration: BroadcastConfiguration,
    ) -> Result<(), EngineFailure> {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(&id) {
            return Err(EngineFailure::new(
                FailureCode::DuplicateId,
                format!("broadcast {id} already exists"),
            ));
        }

        sessions.insert(
            id,
            SessionRecord {
                media,
                configuration,
                state: SessionState::Created,
            },
        );
        Ok(())
    }

    /// Move a session to `Started`, returning its previous state.
    ///
    /// Starting a started session leaves it unchanged.
    pub fn start(&self, id: i64) -> Result<SessionState, EngineFailure> {
        let mut sessions = self.sessions.lock();
        let record = sessions.get_mut(&id).ok_or_else(|| unknown(id))?;

        let previous = record.state;
        if previous.is_started() {
            debug!(id, "Already started, ignoring start request");
        }
        record.state = SessionState::Started;
        Ok(previous)
    }

    /// Remove a session, returning its last state.
    pub fn remove(&self, id: i64) -> Result<SessionState, EngineFailure> {
        self.sessions
            .lock()
            .remove(&id)
            .map(|record| record.state)
            .ok_or_else(|| unknown(id))
    }

    /// Current state of a session.
    pub fn state(&self, id: i64) -> Option<SessionState> {
        self.sessions.lock().get(&id).map(|record| record.state)
    }

    /// Copy of a session's record.
    pub fn get(&self, id: i64) -> Option<SessionRecord> {
        self.sessions.lock().get(&id).cloned()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Returns true if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Remove every session, returning ids and records in id order.
    pub fn drain(&self) -> Vec<(i64, SessionRecord)> {
        let mut drained: Vec<_> = self.sessions.lock().drain().collect();
        drained.sort_by_key(|(id, _)| *id);
        drained
    }
}

fn unknown(id: i64) -> EngineFailure {
    EngineFailure::new(FailureCode::UnknownSession, format!("no broadcast with id {id}"))
}
