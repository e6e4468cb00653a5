//! SpeakQ Audio Player (speakq-ap) - Main entry point
//!
//! Starts the HTTP intake server and the single playback worker, and exits
//! non-zero if the worker dies.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use speakq_ap::api::{self, AppContext};
use speakq_ap::audio::output::CpalPlaybackDevice;
use speakq_ap::config::TomlConfig;
use speakq_ap::playback::{PlaybackWorker, SpeechPipeline};
use speakq_ap::state::SharedState;
use speakq_ap::synthesis::build_synthesizer;
use tokio::signal;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for speakq-ap
#[derive(Parser, Debug)]
#[command(name = "speakq-ap")]
#[command(about = "Ordered text-to-speech playback service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "SPEAKQ_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config file)
    #[arg(short, long, env = "SPEAKQ_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Print the available audio output devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Priority: CLI/env > TOML > defaults
    let mut config =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }

    // Initialize tracing (RUST_LOG wins over the config file)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.list_devices {
        for name in CpalPlaybackDevice::list_devices().context("Failed to list audio devices")? {
            println!("{}", name);
        }
        return Ok(());
    }

    info!("Starting SpeakQ Audio Player v{}", env!("CARGO_PKG_VERSION"));

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_addr, config.port))?;

    let state = Arc::new(SharedState::new());

    let synthesizer =
        build_synthesizer(&config.provider).context("Failed to initialize synthesis provider")?;
    let device = Arc::new(CpalPlaybackDevice::new(
        config.playback.device.clone(),
        config.playback.volume,
    ));
    let pipeline = Arc::new(
        SpeechPipeline::from_config(&config, synthesizer, device).with_events(state.events.clone()),
    );
    info!(
        "Playback pipeline ready (max chunk {} chars, {} attempts, {}s retry delay)",
        pipeline.max_chunk_chars(),
        config.retry.max_attempts,
        config.retry.delay_secs
    );

    let shutdown = CancellationToken::new();

    let worker = PlaybackWorker::new(
        Arc::clone(&state),
        pipeline,
        config.worker.idle_interval(),
    );
    let mut worker_task = tokio::spawn(worker.run(shutdown.clone()));

    let server_shutdown = shutdown.clone();
    let mut server_task = tokio::spawn(api::server::run(addr, AppContext { state }, async move {
        server_shutdown.cancelled().await
    }));

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    tokio::select! {
        joined = &mut worker_task => {
            shutdown.cancel();
            if let Ok(Err(e)) = server_task.await {
                error!("HTTP server error during shutdown: {}", e);
            }
            worker_result(joined)
        }
        served = &mut server_task => {
            shutdown.cancel();
            let worker = worker_task.await;
            served
                .context("HTTP server task failed")?
                .context("HTTP server error")?;
            worker_result(worker)?;
            info!("Shutdown complete");
            Ok(())
        }
    }
}

/// Map the worker task's exit to the process result
fn worker_result(joined: std::result::Result<speakq_ap::Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!(severity = "CRITICAL", "Playback worker terminated: {}", e);
            Err(anyhow!(e).context("Playback worker terminated"))
        }
        Err(e) => Err(anyhow!("Playback worker task failed: {}", e)),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
