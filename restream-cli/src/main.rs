//! Restream command-line entry point.
//!
//! ```text
//! restream --config broadcast.json [--hold-secs 30]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use restream_lib::{init_logging, run, RestreamConfig};

/// Restream a media source through the broadcast engine.
#[derive(Debug, Parser)]
#[command(name = "restream", version)]
struct Cli {
    /// Path to the JSON broadcast description.
    #[arg(long, env = "RESTREAM_CONFIG")]
    config: PathBuf,

    /// Seconds to keep the broadcast running; overrides `hold_secs` in the file.
    #[arg(long, env = "RESTREAM_HOLD_SECS")]
    hold_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = RestreamConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let hold = cli
        .hold_secs
        .map(std::time::Duration::from_secs)
        .or_else(|| config.hold());

    info!(id = config.id, "Restream starting");
    run(config, hold).await
}
