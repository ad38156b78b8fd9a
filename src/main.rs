//! Streaming ASR - replays an audio file through a sherpa-onnx online recognizer.
//!
//! Audio is fed in fixed-duration chunks at real-time pace; interim and final
//! transcripts are printed as they arrive. Without usable model files the recognizer
//! falls back to a placeholder so the full flow can still be exercised.

mod audio;
mod config;
mod setup;
mod stt;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use audio::{ConsoleSink, FileReplay, ReplayOptions, ReplaySummary};
use config::{AppConfig, FileConfig};
use stt::Session;

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn wait_for_shutdown(shutdown: Arc<AtomicBool>) {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("🛑 Received Ctrl+C, stopping...");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler");
                sigterm.recv().await;
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("🛑 Received SIGTERM, stopping...");
        }
    }

    shutdown.store(true, Ordering::SeqCst);
}

/// Replay the configured audio file on a blocking thread, stopping early on a signal.
async fn run_replay(config: &FileConfig, session: Arc<Session>) -> Result<ReplaySummary> {
    let session_config = config.session_config();
    let wav = config.test_wav.clone();
    let shutdown = Arc::new(AtomicBool::new(false));
    let replay_shutdown = shutdown.clone();

    let mut replay = tokio::task::spawn_blocking(move || {
        let options = ReplayOptions::realtime(&session_config);
        let mut sink = ConsoleSink::stdout();
        FileReplay::new(&session, &session_config, options).with_shutdown(replay_shutdown).run(&wav, &mut sink)
    });

    let result = tokio::select! {
        result = &mut replay => result,
        _ = wait_for_shutdown(shutdown) => {
            debug!("Waiting for replay to stop");
            replay.await
        }
    };

    Ok(result.context("Replay task panicked")??)
}

fn log_summary(summary: &ReplaySummary) {
    debug!(
        "Replayed {} bytes in {} chunks, {} final line(s)",
        summary.payload_bytes,
        summary.chunks,
        summary.finals.len()
    );

    if summary.interrupted {
        info!("⏹️  Stopped before the end of the audio");
    } else if summary.outcome.is_none() {
        info!("No final result after draining");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if args.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🎤 Streaming ASR v{}", env!("CARGO_PKG_VERSION"));

    let config = args.load_file_config()?;

    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    }

    if args.check {
        let report = setup::check(&config);
        setup::log_report(&config, &report);
        std::process::exit(if report.is_ok() { 0 } else { 1 });
    }

    if !config.test_wav.is_file() {
        error!("❌ Audio file not found: {}", config.test_wav.display());
        std::process::exit(1);
    }

    config.log_config();

    let session = Arc::new(Session::open(&config.session_config()));

    let result = run_replay(&config, session.clone()).await;
    session.close();

    let summary = result?;
    log_summary(&summary);

    info!("✨ Done!");
    Ok(())
}
