//! The broadcast session handle.

use tracing::{debug, info, instrument};

use restream_ipc::{BroadcastConfiguration, EngineRequest, Media};

use crate::channel::EngineChannel;
use crate::error::BroadcastError;
use crate::BroadcastResult;

/// Handle for one restreaming session held by the engine.
///
/// The only way to obtain a handle is [`Broadcast::create`], which returns
/// once the engine has acknowledged the session. The handle keeps no state
/// machine of its own: whether a session is created, started or disposed is
/// decided by the engine, and requests are forwarded without checking order
/// or id uniqueness.
#[derive(Debug)]
pub struct Broadcast<C> {
    id: i64,
    media: Media,
    configuration: BroadcastConfiguration,
    channel: C,
}

impl<C: EngineChannel> Broadcast<C> {
    /// Ask the engine to create a broadcast session.
    ///
    /// On failure no handle is returned.
    #[instrument(name = "broadcast_create", skip(channel, media, configuration))]
    pub async fn create(
        channel: C,
        id: i64,
        media: Media,
        configuration: BroadcastConfiguration,
    ) -> BroadcastResult<Self> {
        debug!(dst = configuration.dst(), access = configuration.access(), "Creating broadcast");

        let request = EngineRequest::CreateBroadcast {
            id,
            media: media.to_map(),
            configuration: configuration.to_map(),
        };
        send(&channel, request).await?;

        info!("Broadcast created");
        Ok(Self {
            id,
            media,
            configuration,
            channel,
        })
    }

    /// Ask the engine to start restreaming.
    #[instrument(name = "broadcast_start", skip(self), fields(id = self.id))]
    pub async fn start(&self) -> BroadcastResult<()> {
        send(&self.channel, EngineRequest::StartBroadcast { id: self.id }).await?;
        info!("Broadcast started");
        Ok(())
    }

    /// Ask the engine to release the session.
    ///
    /// The handle must not be used afterwards; the engine is the authority
    /// on what further requests for this id do.
    #[instrument(name = "broadcast_dispose", skip(self), fields(id = self.id))]
    pub async fn dispose(&self) -> BroadcastResult<()> {
        send(&self.channel, EngineRequest::DisposeBroadcast { id: self.id }).await?;
        info!("Broadcast disposed");
        Ok(())
    }

    /// Caller-assigned session id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Media being broadcast.
    pub fn media(&self) -> &Media {
        &self.media
    }

    /// Configuration captured at creation.
    pub fn configuration(&self) -> &BroadcastConfiguration {
        &self.configuration
    }
}

async fn send<C: EngineChannel>(channel: &C, request: EngineRequest) -> BroadcastResult<()> {
    let method = request.method();
    let id = request.id();
    channel
        .invoke(request)
        .await
        .map_err(|source| BroadcastError::new(method, id, source))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::Value;

    use restream_ipc::{EngineFailure, FailureCode, METHOD_CREATE, METHOD_DISPOSE, METHOD_START};

    use super::*;
    use crate::error::ChannelError;

    /// Records every request and answers from a script (acknowledging by default).
    #[derive(Debug, Default)]
    struct RecordingChannel {
        requests: Mutex<Vec<EngineRequest>>,
        replies: Mutex<VecDeque<Result<(), ChannelError>>>,
    }

    impl RecordingChannel {
        fn failing_with(error: ChannelError) -> Self {
            let channel = Self::default();
            channel.replies.lock().push_back(Err(error));
            channel
        }

        fn methods(&self) -> Vec<&'static str> {
            self.requests.lock().iter().map(EngineRequest::method).collect()
        }
    }

    impl EngineChannel for RecordingChannel {
        async fn invoke(&self, request: EngineRequest) -> Result<(), ChannelError> {
            self.requests.lock().push(request);
            let reply = self.replies.lock().pop_front();
            reply.unwrap_or(Ok(()))
        }
    }

    fn configuration() -> BroadcastConfiguration {
        BroadcastConfiguration::new("http", "mpeg1", "127.0.0.1:8080", "mp1v", 1024, "mpga", 128)
    }

    #[tokio::test]
    async fn test_create_sends_full_payload() {
        let channel = RecordingChannel::default();
        let media = Media::file("/videos/demo.mp4");

        let broadcast = Broadcast::create(&channel, 1, media.clone(), configuration())
            .await
            .unwrap();

        assert_eq!(broadcast.id(), 1);
        assert_eq!(broadcast.media(), &media);
        assert_eq!(broadcast.configuration(), &configuration());

        let requests = channel.requests.lock();
        assert_eq!(requests.len(), 1);
        let payload = requests[0].payload();
        assert_eq!(requests[0].method(), METHOD_CREATE);
        assert_eq!(payload["id"].as_i64(), Some(1));
        assert_eq!(payload["media"], Value::Object(media.to_map()));
        assert_eq!(
            payload["configuration"],
            serde_json::json!({
                "access": "http",
                "mux": "mpeg1",
                "dst": "127.0.0.1:8080",
                "vcodec": "mp1v",
                "vb": 1024,
                "acodec": "mpga",
                "ab": 128,
            })
        );
    }

    #[tokio::test]
    async fn test_start_and_dispose_send_id_only() {
        let channel = RecordingChannel::default();
        let broadcast = Broadcast::create(&channel, 42, Media::network("http://src/live"), configuration())
            .await
            .unwrap();

        broadcast.start().await.unwrap();
        broadcast.dispose().await.unwrap();

        let requests = channel.requests.lock();
        assert_eq!(requests[1], EngineRequest::StartBroadcast { id: 42 });
        assert_eq!(requests[2], EngineRequest::DisposeBroadcast { id: 42 });
    }

    #[tokio::test]
    async fn test_create_then_dispose_without_start() {
        let channel = RecordingChannel::default();
        let broadcast = Broadcast::create(&channel, 5, Media::asset("intro.mp4"), configuration())
            .await
            .unwrap();

        broadcast.dispose().await.unwrap();

        assert_eq!(channel.methods(), vec![METHOD_CREATE, METHOD_DISPOSE]);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_forwarded() {
        let channel = RecordingChannel::default();
        let broadcast = Broadcast::create(&channel, 5, Media::asset("intro.mp4"), configuration())
            .await
            .unwrap();

        broadcast.start().await.unwrap();
        broadcast.start().await.unwrap();
        broadcast.dispose().await.unwrap();
        broadcast.start().await.unwrap();

        assert_eq!(
            channel.methods(),
            vec![METHOD_CREATE, METHOD_START, METHOD_START, METHOD_DISPOSE, METHOD_START]
        );
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_not_checked_locally() {
        let channel = Arc::new(RecordingChannel::default());

        let first = Broadcast::create(Arc::clone(&channel), 3, Media::file("a.mp4"), configuration())
            .await
            .unwrap();
        let second = Broadcast::create(Arc::clone(&channel), 3, Media::file("b.mp4"), configuration())
            .await
            .unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(channel.methods(), vec![METHOD_CREATE, METHOD_CREATE]);
    }

    #[tokio::test]
    async fn test_create_failure_returns_no_handle() {
        let failure = EngineFailure::new(FailureCode::MalformedPayload, "bad dst");
        let channel = RecordingChannel::failing_with(ChannelError::Rejected(failure.clone()));

        let err = Broadcast::create(&channel, 8, Media::file("in.mp4"), configuration())
            .await
            .unwrap_err();

        assert_eq!(err.method(), METHOD_CREATE);
        assert_eq!(err.id(), 8);
        match err.into_channel_error() {
            ChannelError::Rejected(reported) => assert_eq!(reported, failure),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(channel.requests.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_start_failure_is_passed_through() {
        let channel = RecordingChannel::default();
        let broadcast = Broadcast::create(&channel, 11, Media::file("in.mp4"), configuration())
            .await
            .unwrap();
        channel.replies.lock().push_back(Err(ChannelError::Disconnected));

        let err = broadcast.start().await.unwrap_err();

        assert_eq!(err.method(), METHOD_START);
        assert!(matches!(err.channel_error(), ChannelError::Disconnected));
        assert_eq!(err.to_string(), "Broadcast.start for broadcast 11 failed");

        // Not retried.
        assert_eq!(channel.methods(), vec![METHOD_CREATE, METHOD_START]);
    }
}
