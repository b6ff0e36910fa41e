//! Requests sent from the binding to the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Payload;

/// Method name for broadcast creation.
pub const METHOD_CREATE: &str = "Broadcast.create";

/// Method name for starting a broadcast.
pub const METHOD_START: &str = "Broadcast.start";

/// Method name for disposing a broadcast.
pub const METHOD_DISPOSE: &str = "Broadcast.dispose";

/// Requests that the binding can send to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineRequest {
    /// Instantiate a broadcast session.
    CreateBroadcast {
        id: i64,
        /// Serialized media reference.
        media: Payload,
        /// Serialized broadcast configuration.
        configuration: Payload,
    },

    /// Begin restreaming an existing session.
    StartBroadcast { id: i64 },

    /// Release every engine-side resource held by a session.
    DisposeBroadcast { id: i64 },
}

impl EngineRequest {
    /// Returns the session id this request targets.
    pub fn id(&self) -> i64 {
        match self {
            Self::CreateBroadcast { id, .. }
            | Self::StartBroadcast { id }
            | Self::DisposeBroadcast { id } => *id,
        }
    }

    /// Returns the method name for this request.
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateBroadcast { .. } => METHOD_CREATE,
            Self::StartBroadcast { .. } => METHOD_START,
            Self::DisposeBroadcast { .. } => METHOD_DISPOSE,
        }
    }

    /// Returns the request body as a field mapping.
    pub fn payload(&self) -> Payload {
        let mut map = Payload::new();
        map.insert("id".into(), Value::from(self.id()));
        if let Self::CreateBroadcast {
            media,
            configuration,
            ..
        } = self
        {
            map.insert("media".into(), Value::Object(media.clone()));
            map.insert("configuration".into(), Value::Object(configuration.clone()));
        }
        map
    }
}
