//! Engine acknowledgements.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The engine's answer to a single request.
pub type EngineReply = Result<(), EngineFailure>;

/// Reason code attached by the engine to a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCode {
    /// A live session already uses this id.
    DuplicateId,

    /// No live session has this id.
    UnknownSession,

    /// The request body could not be decoded.
    MalformedPayload,

    /// The engine is shutting down.
    ShuttingDown,
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DuplicateId => "duplicate id",
            Self::UnknownSession => "unknown session",
            Self::MalformedPayload => "malformed payload",
            Self::ShuttingDown => "shutting down",
        };
        f.write_str(name)
    }
}

/// A rejection reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct EngineFailure {
    /// Engine-assigned reason code.
    pub code: FailureCode,

    /// Human readable detail.
    pub message: String,
}

impl EngineFailure {
    /// Create a new failure.
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
