//! Request/acknowledge channel to the engine.

use std::future::Future;
use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::{debug, trace};

use restream_ipc::{EngineRequest, Envelope};

use crate::error::ChannelError;

/// A transport that delivers one request and resolves with the engine's reply.
pub trait EngineChannel: Send + Sync {
    /// Send `request` and wait for its acknowledgement.
    fn invoke(
        &self,
        request: EngineRequest,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;
}

impl<T: EngineChannel> EngineChannel for &T {
    async fn invoke(&self, request: EngineRequest) -> Result<(), ChannelError> {
        (**self).invoke(request).await
    }
}

impl<T: EngineChannel> EngineChannel for Arc<T> {
    async fn invoke(&self, request: EngineRequest) -> Result<(), ChannelError> {
        (**self).invoke(request).await
    }
}

/// Client end of an engine request channel.
#[derive(Debug, Clone)]
pub struct EngineClient {
    request_tx: Sender<Envelope>,
}

impl EngineClient {
    /// Wrap the sending half of a request channel.
    pub fn new(request_tx: Sender<Envelope>) -> Self {
        Self { request_tx }
    }
}

impl EngineChannel for EngineClient {
    async fn invoke(&self, request: EngineRequest) -> Result<(), ChannelError> {
        let method = request.method();
        let (envelope, reply_rx) = Envelope::new(request);

        // A full queue parks a blocking-pool thread until the engine frees a slot.
        let request_tx = self.request_tx.clone();
        tokio::task::spawn_blocking(move || request_tx.send(envelope))
            .await
            .map_err(|_| ChannelError::Disconnected)?
            .map_err(|_| ChannelError::Disconnected)?;
        trace!(method, "Request queued");

        let reply = reply_rx.await.map_err(|_| ChannelError::ReplyDropped)?;
        debug!(method, ok = reply.is_ok(), "Reply received");

        reply.map_err(ChannelError::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restream_ipc::{request_channel, EngineFailure, FailureCode, REQUEST_CHANNEL_CAPACITY};

    #[tokio::test]
    async fn test_invoke_acknowledged() {
        let (tx, rx) = request_channel();
        let client = EngineClient::new(tx);

        let engine = std::thread::spawn(move || {
            let envelope = rx.recv().unwrap();
            assert_eq!(envelope.request, EngineRequest::StartBroadcast { id: 4 });
            envelope.reply_tx.send(Ok(())).unwrap();
        });

        client
            .invoke(EngineRequest::StartBroadcast { id: 4 })
            .await
            .unwrap();
        engine.join().unwrap();
    }

    #[tokio::test]
    async fn test_invoke_rejected() {
        let (tx, rx) = request_channel();
        let client = EngineClient::new(tx);

        let engine = std::thread::spawn(move || {
            let envelope = rx.recv().unwrap();
            let failure = EngineFailure::new(FailureCode::UnknownSession, "no session 9");
            envelope.reply_tx.send(Err(failure)).unwrap();
        });

        let err = client
            .invoke(EngineRequest::DisposeBroadcast { id: 9 })
            .await
            .unwrap_err();
        engine.join().unwrap();

        match err {
            ChannelError::Rejected(failure) => {
                assert_eq!(failure.code, FailureCode::UnknownSession);
                assert_eq!(failure.message, "no session 9");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_disconnected() {
        let (tx, rx) = request_channel();
        drop(rx);
        let client = EngineClient::new(tx);

        let err = client
            .invoke(EngineRequest::StartBroadcast { id: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Disconnected));
    }

    #[tokio::test]
    async fn test_invoke_reply_dropped() {
        let (tx, rx) = request_channel();
        let client = EngineClient::new(tx);

        let engine = std::thread::spawn(move || {
            let envelope = rx.recv().unwrap();
            drop(envelope);
        });

        let err = client
            .invoke(EngineRequest::StartBroadcast { id: 1 })
            .await
            .unwrap_err();
        engine.join().unwrap();
        assert!(matches!(err, ChannelError::ReplyDropped));
    }

    #[tokio::test]
    async fn test_invoke_waits_for_queue_space() {
        let (tx, rx) = request_channel();
        for _ in 0..REQUEST_CHANNEL_CAPACITY {
            let (envelope, _reply_rx) = Envelope::new(EngineRequest::StartBroadcast { id: 0 });
            tx.try_send(envelope).unwrap();
        }
        let client = EngineClient::new(tx);

        let engine = std::thread::spawn(move || {
            for _ in 0..REQUEST_CHANNEL_CAPACITY {
                drop(rx.recv().unwrap());
            }
            let envelope = rx.recv().unwrap();
            assert_eq!(envelope.request, EngineRequest::StartBroadcast { id: 1 });
            envelope.reply_tx.send(Ok(())).unwrap();
        });

        client
            .invoke(EngineRequest::StartBroadcast { id: 1 })
            .await
            .unwrap();
        engine.join().unwrap();
    }
}
