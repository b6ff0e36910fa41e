//! Request loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use restream_ipc::{
    BroadcastConfiguration, BroadcastEvent, EngineFailure, EngineReply, EngineRequest, Envelope,
    FailureCode, Payload, SessionState,
};

use crate::metrics::EngineMetrics;
use crate::state::SessionRegistry;

/// How long the loop waits for a request before re-checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The loopback broadcast engine.
pub struct Engine {
    request_rx: Receiver<Envelope>,
    event_tx: Sender<BroadcastEvent>,
    sessions: Arc<SessionRegistry>,
    metrics: Arc<EngineMetrics>,
    should_stop: Arc<AtomicBool>,
}

impl Engine {
    /// Create a new engine.
    pub fn new(request_rx: Receiver<Envelope>, event_tx: Sender<BroadcastEvent>) -> Self {
        Self {
            request_rx,
            event_tx,
            sessions: Arc::new(SessionRegistry::new()),
            metrics: Arc::new(EngineMetrics::new()),
            should_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Session table shared with the running loop.
    pub fn sessions(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.sessions)
    }

    /// Counters shared with the running loop.
    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the engine on a dedicated thread.
    pub fn spawn(mut self) -> EngineHandle {
        let should_stop = Arc::clone(&self.should_stop);
        let sessions = self.sessions();
        let metrics = self.metrics();
        let thread = thread::spawn(move || self.run());

        EngineHandle {
            thread: Some(thread),
            should_stop,
            sessions,
            metrics,
        }
    }

    /// Run the engine (blocking).
    ///
    /// Returns once every client has dropped its sender or a stop was
    /// requested. Sessions still open at that point are released.
    #[instrument(name = "engine_run", skip(self))]
    pub fn run(&mut self) {
        info!("Engine starting");
        self.send_event(BroadcastEvent::Ready);

        while !self.should_stop.load(Ordering::SeqCst) {
            match self.request_rx.recv_timeout(POLL_INTERVAL) {
                Ok(envelope) => self.handle_envelope(envelope),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Request channel disconnected, shutting down");
                    break;
                }
            }
        }

        self.reject_pending();
        self.release_all();
        self.send_event(BroadcastEvent::Shutdown);

        let snapshot = self.metrics.snapshot();
        info!(
            received = snapshot.received,
            acknowledged = snapshot.acknowledged,
            rejected = snapshot.rejected,
            "Engine stopped"
        );
    }

    fn handle_envelope(&self, envelope: Envelope) {
        let Envelope { request, reply_tx } = envelope;
        debug!(method = request.method(), id = request.id(), "Handling request");
        self.metrics.record_received();

        let id = request.id();
        let method = request.method();
        let reply = self.handle_request(request);

        match &reply {
            Ok(()) => self.metrics.record_acknowledged(),
            Err(failure) => {
                warn!(method, id, %failure, "Request rejected");
                self.metrics.record_rejected();
                self.send_event(BroadcastEvent::Rejected {
                    id,
                    method: method.to_string(),
                    failure: failure.clone(),
                });
            }
        }
        self.metrics.set_live_sessions(self.sessions.len());

        if reply_tx.send(reply).is_err() {
            debug!(method, id, "Caller went away before the reply");
        }
    }

    fn handle_request(&self, request: EngineRequest) -> EngineReply {
        match request {
            EngineRequest::CreateBroadcast {
                id,
                media,
                configuration,
            } => self.create_broadcast(id, media, configuration),
            EngineRequest::StartBroadcast { id } => self.start_broadcast(id),
            EngineRequest::DisposeBroadcast { id } => self.dispose_broadcast(id),
        }
    }

    fn create_broadcast(&self, id: i64, media: Payload, configuration: Payload) -> EngineReply {
        let configuration: BroadcastConfiguration =
            serde_json::from_value(Value::Object(configuration)).map_err(|e| {
                EngineFailure::new(FailureCode::MalformedPayload, format!("configuration: {e}"))
            })?;

        if !media.get("resource").is_some_and(Value::is_string) {
            return Err(EngineFailure::new(
                FailureCode::MalformedPayload,
                "media: missing resource",
            ));
        }

        info!(
            id,
            access = configuration.access(),
            mux = configuration.mux(),
            dst = configuration.dst(),
            "Creating broadcast"
        );
        self.sessions.insert(id, media, configuration)?;
        self.transition(id, None, SessionState::Created);
        Ok(())
    }

    fn start_broadcast(&self, id: i64) -> EngineReply {
        let previous = self.sessions.start(id)?;
        if !previous.is_started() {
            info!(id, "Starting broadcast");
            self.transition(id, Some(previous), SessionState::Started);
        }
        Ok(())
    }

    fn dispose_broadcast(&self, id: i64) -> EngineReply {
        let previous = self.sessions.remove(id)?;
        info!(id, "Disposing broadcast");
        self.transition(id, Some(previous), SessionState::Disposed);
        Ok(())
    }

    /// Answer everything still queued with a shutdown failure, then close
    /// the request queue.
    ///
    /// Once the receiver is gone, new sends fail with a disconnect. A request
    /// that lands between the last `try_recv` and the drop is discarded, and
    /// its caller sees the reply slot dropped.
    fn reject_pending(&mut self) {
        let request_rx = std::mem::replace(&mut self.request_rx, crossbeam_channel::never());
        while let Ok(Envelope { request, reply_tx }) = request_rx.try_recv() {
            debug!(method = request.method(), id = request.id(), "Rejecting queued request");
            self.metrics.record_received();
            self.metrics.record_rejected();
            let failure = EngineFailure::new(FailureCode::ShuttingDown, "engine is stopping");
            let _ = reply_tx.send(Err(failure));
        }
        drop(request_rx);
    }

    fn release_all(&self) {
        let remaining = self.sessions.drain();
        if !remaining.is_empty() {
            warn!(count = remaining.len(), "Releasing sessions left open");
        }
        for (id, record) in remaining {
            info!(
                id,
                dst = record.configuration.dst(),
                resource = ?record.media.get("resource"),
                "Releasing broadcast"
            );
            self.transition(id, Some(record.state), SessionState::Disposed);
        }
        self.metrics.set_live_sessions(0);
    }

    fn transition(&self, id: i64, previous: Option<SessionState>, current: SessionState) {
        debug!(
            id,
            previous = ?previous.map(SessionState::name),
            current = current.name(),
            "State transition"
        );

        self.send_event(BroadcastEvent::StateChanged {
            id,
            previous,
            current,
        });
    }

    fn send_event(&self, event: BroadcastEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Owner of a spawned engine thread.
///
/// `shutdown`, `join` and drop all block on the thread; from async code call
/// them through `tokio::task::spawn_blocking`.
pub struct EngineHandle {
    thread: Option<JoinHandle<()>>,
    should_stop: Arc<AtomicBool>,
    sessions: Arc<SessionRegistry>,
    metrics: Arc<EngineMetrics>,
}

impl EngineHandle {
    /// Session table of the running engine.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Counters of the running engine.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Stop the engine and wait for its thread to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    /// Wait for the engine to exit on its own (all clients dropped).
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Engine thread panicked");
            }
        }
    }

    fn stop_and_join(&mut self) {
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Engine thread panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
