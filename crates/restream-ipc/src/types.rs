//! Value types carried inside requests.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mapping from field name to primitive value, as sent across the boundary.
pub type Payload = Map<String, Value>;

/// Parameters for one broadcast.
///
/// Every field is mandatory and nothing is validated here; codec, mux and
/// access identifiers are forwarded to the engine as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastConfiguration {
    access: String,
    mux: String,
    dst: String,
    vcodec: String,
    vb: u32,
    acodec: String,
    ab: u32,
}

impl BroadcastConfiguration {
    /// Create a configuration from all seven parameters.
    pub fn new(
        access: impl Into<String>,
        mux: impl Into<String>,
        dst: impl Into<String>,
        vcodec: impl Into<String>,
        vb: u32,
        acodec: impl Into<String>,
        ab: u32,
    ) -> Self {
        Self {
            access: access.into(),
            mux: mux.into(),
            dst: dst.into(),
            vcodec: vcodec.into(),
            vb,
            acodec: acodec.into(),
            ab,
        }
    }

    /// Access method (e.g. "http").
    pub fn access(&self) -> &str {
        &self.access
    }

    /// Mux format (e.g. "mpeg1").
    pub fn mux(&self) -> &str {
        &self.mux
    }

    /// Destination address (e.g. "127.0.0.1:8080").
    pub fn dst(&self) -> &str {
        &self.dst
    }

    /// Video codec identifier.
    pub fn vcodec(&self) -> &str {
        &self.vcodec
    }

    /// Video bitrate.
    pub fn vb(&self) -> u32 {
        self.vb
    }

    /// Audio codec identifier.
    pub fn acodec(&self) -> &str {
        &self.acodec
    }

    /// Audio bitrate.
    pub fn ab(&self) -> u32 {
        self.ab
    }

    /// Serialize into the seven-key mapping sent to the engine.
    pub fn to_map(&self) -> Payload {
        let mut map = Payload::new();
        map.insert("access".into(), Value::from(self.access.as_str()));
        map.insert("mux".into(), Value::from(self.mux.as_str()));
        map.insert("dst".into(), Value::from(self.dst.as_str()));
        map.insert("vcodec".into(), Value::from(self.vcodec.as_str()));
        map.insert("vb".into(), Value::from(self.vb));
        map.insert("acodec".into(), Value::from(self.acodec.as_str()));
        map.insert("ab".into(), Value::from(self.ab));
        map
    }
}

/// Where a media reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// A local file path.
    File,

    /// A network URL.
    Network,

    /// A bundled application asset.
    Asset,
}

impl MediaType {
    /// Returns the wire name for this media type.
    pub fn name(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Network => "network",
            Self::Asset => "asset",
        }
    }
}

/// A media source reference.
///
/// The engine owns the meaning of `resource`; this crate only carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Kind of resource.
    pub media_type: MediaType,

    /// Path, URL or asset name.
    pub resource: String,

    /// Playback start offset.
    #[serde(default, with = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Duration>,

    /// Playback stop offset.
    #[serde(default, with = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<Duration>,
}

impl Media {
    fn new(media_type: MediaType, resource: impl Into<String>) -> Self {
        Self {
            media_type,
            resource: resource.into(),
            start_time: None,
            stop_time: None,
        }
    }

    /// Media backed by a local file.
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(MediaType::File, path)
    }

    /// Media backed by a network URL.
    pub fn network(url: impl Into<String>) -> Self {
        Self::new(MediaType::Network, url)
    }

    /// Media backed by an application asset.
    pub fn asset(name: impl Into<String>) -> Self {
        Self::new(MediaType::Asset, name)
    }

    /// Set the start offset.
    pub fn with_start_time(mut self, start: Duration) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Set the stop offset.
    pub fn with_stop_time(mut self, stop: Duration) -> Self {
        self.stop_time = Some(stop);
        self
    }

    /// Serialize into the mapping sent to the engine.
    pub fn to_map(&self) -> Payload {
        let mut map = Payload::new();
        map.insert("type".into(), Value::from(self.media_type.name()));
        map.insert("resource".into(), Value::from(self.resource.as_str()));
        if let Some(start) = self.start_time {
            map.insert("start_time_ms".into(), Value::from(duration_to_ms(start)));
        }
        if let Some(stop) = self.stop_time {
            map.insert("stop_time_ms".into(), Value::from(duration_to_ms(stop)));
        }
        map
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_u64(super::duration_to_ms(*duration)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
