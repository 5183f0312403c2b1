//! mirror-agent entry point.
//!
//! Accepts one peer, sends the device-info handshake, then runs the
//! decode/dispatch loop on the read half until the peer disconnects.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()              -- TOML file, CLI overrides
//!  └─ TcpListener::accept()      -- exactly one peer
//!  └─ send_device_info()         -- on the write half
//!  └─ EventDispatcher::run()     -- on the read half
//!       ├─ ControlConnection     -> decoded ControlEvents
//!       ├─ FrameGeometry         -> coordinate mapping
//!       ├─ AsciiCharacterMap     -> text to key strokes
//!       └─ LoggingInputInjector  -> dry-run injection
//! ```
//!
//! The write half would carry the video stream; it is shut down when the
//! dispatch loop ends.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use mirror_agent::application::dispatch_events::EventDispatcher;
use mirror_agent::infrastructure::{
    config::{load_config, AgentConfig},
    connection::{send_device_info, ControlConnection},
    input_injection::logging::LoggingInputInjector,
};
use mirror_core::keymap::AsciiCharacterMap;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Screen-mirroring control agent.
///
/// Accepts a single peer, advertises the device, and injects the input
/// events the peer sends back.
#[derive(Debug, Parser)]
#[command(name = "mirror-agent", version)]
struct Cli {
    /// Path to the TOML configuration file.  A missing file means defaults.
    #[arg(long, default_value = "mirror-agent.toml", env = "MIRROR_AGENT_CONFIG")]
    config: PathBuf,

    /// Overrides `network.listen_addr` from the config file.
    #[arg(long)]
    listen: Option<String>,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    fn into_agent_config(self) -> anyhow::Result<AgentConfig> {
        let mut config = load_config(&self.config)
            .with_context(|| format!("failed to load config from {}", self.config.display()))?;
        if let Some(listen) = self.listen {
            config.network.listen_addr = listen;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_agent_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let listen_addr = config.listen_addr()?;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!("mirror-agent listening on {listen_addr}");

    let (stream, peer) = listener.accept().await.context("failed to accept peer")?;
    // Only one peer is ever served.
    drop(listener);
    if let Err(e) = stream.set_nodelay(true) {
        warn!("could not disable Nagle on control socket: {e}");
    }

    let span = info_span!("connection", id = %Uuid::new_v4(), %peer);
    run_session(stream, &config).instrument(span).await
}

/// Serves one accepted peer until it disconnects or the process is interrupted.
async fn run_session(stream: tokio::net::TcpStream, config: &AgentConfig) -> anyhow::Result<()> {
    info!("peer connected");
    let (reader, mut writer) = stream.into_split();

    send_device_info(&mut writer, &config.device_info())
        .await
        .context("failed to send device info")?;

    let injector = Arc::new(LoggingInputInjector::new(config.device.screen_on));
    let mut dispatcher = EventDispatcher::new(
        injector.clone(),
        Arc::new(config.geometry()),
        Arc::new(AsciiCharacterMap::new()),
        injector.clone(),
    );
    let mut connection =
        ControlConnection::with_pooled_pointers(reader, config.control.pooled_pointer_slots);

    let result = tokio::select! {
        result = dispatcher.run(&mut connection) => result.map_err(anyhow::Error::from),
        signal = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C; closing connection");
            signal.context("failed to listen for Ctrl+C")
        }
    };

    if let Err(e) = writer.shutdown().await {
        warn!("failed to shut down transport: {e}");
    }
    info!(injected = injector.injected(), "session ended");
    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
