//! Restream command-line application library.

mod config;

use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restream_client::{Broadcast, EngineChannel, EngineClient};
use restream_engine::{create_engine, EngineHandle};
use restream_ipc::{event_channel, request_channel, BroadcastEvent};

pub use config::{ConfigError, RestreamConfig};

/// Initialize logging.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "restream=debug,restream_lib=debug,restream_client=debug,restream_engine=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run one broadcast against an in-process engine.
///
/// Creates and starts the broadcast, holds it for `hold` (or until ctrl-c
/// when `None`), then disposes it and waits for the engine to exit.
#[instrument(name = "restream_run", skip(config), fields(id = config.id))]
pub async fn run(config: RestreamConfig, hold: Option<Duration>) -> anyhow::Result<()> {
    let (request_tx, request_rx) = request_channel();
    let (event_tx, event_rx) = event_channel();

    let engine = create_engine(request_rx, event_tx).spawn();
    let client = EngineClient::new(request_tx);

    let outcome = drive(&client, config, hold).await;

    // Dropping the last sender lets the engine release whatever is left open.
    drop(client);
    join_engine(engine).await?;

    for event in event_rx.try_iter() {
        log_event(&event);
    }

    if outcome.is_ok() {
        info!("Done");
    }
    outcome
}

async fn drive<C: EngineChannel>(
    channel: C,
    config: RestreamConfig,
    hold: Option<Duration>,
) -> anyhow::Result<()> {
    let broadcast = Broadcast::create(channel, config.id, config.media, config.configuration)
        .await
        .context("Failed to create broadcast")?;
    broadcast.start().await.context("Failed to start broadcast")?;

    match hold {
        Some(duration) => {
            info!(secs = duration.as_secs(), "Broadcasting");
            tokio::time::sleep(duration).await;
        }
        None => {
            info!("Broadcasting until ctrl-c");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for ctrl-c")?;
        }
    }

    broadcast
        .dispose()
        .await
        .context("Failed to dispose broadcast")
}

/// Wait for the engine thread on the blocking pool.
async fn join_engine(engine: EngineHandle) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || engine.join())
        .await
        .context("Engine thread join failed")
}

fn log_event(event: &BroadcastEvent) {
    match event {
        BroadcastEvent::StateChanged {
            id,
            previous,
            current,
        } => debug!(id = *id, ?previous, ?current, "Engine state change"),
        BroadcastEvent::Rejected {
            id,
            method,
            failure,
        } => debug!(id = *id, method = method.as_str(), %failure, "Engine rejected request"),
        BroadcastEvent::Ready | BroadcastEvent::Shutdown => debug!(?event, "Engine event"),
    }
}
