//! Broadcast description loaded from disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use restream_ipc::{BroadcastConfiguration, Media};

/// Errors raised while loading a [`RestreamConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid broadcast description.
    #[error("Invalid broadcast description: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One broadcast to run.
///
/// ```json
/// {
///   "id": 1,
///   "media": { "media_type": "file", "resource": "/videos/demo.mp4" },
///   "configuration": {
///     "access": "http", "mux": "mpeg1", "dst": "127.0.0.1:8080",
///     "vcodec": "mp1v", "vb": 1024, "acodec": "mpga", "ab": 128
///   },
///   "hold_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RestreamConfig {
    /// Session id passed to the engine.
    pub id: i64,

    /// Source to restream.
    pub media: Media,

    /// Broadcast parameters. Every field is required.
    pub configuration: BroadcastConfiguration,

    /// How long to keep the broadcast running. Runs until ctrl-c when absent.
    #[serde(default)]
    pub hold_secs: Option<u64>,
}

impl RestreamConfig {
    /// Read a description from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse a description from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hold duration, if one was configured.
    pub fn hold(&self) -> Option<Duration> {
        self.hold_secs.map(Duration::from_secs)
    }
}
