//! File-driven audio source.
//!
//! Replays the payload of an audio file through a recognition session in fixed-duration
//! chunks, paced like live capture, then drains the session for a final result.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::pcm::strip_header;
use super::render::TranscriptSink;
use crate::config::SessionConfig;
use crate::stt::{Hypothesis, Session, SessionError};

/// Maximum number of polls after the last chunk.
pub const DRAIN_ATTEMPTS: usize = 20;

/// Delay between drain polls.
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(100);

/// Simulated processing time when no engine is available.
pub const PLACEHOLDER_DELAY: Duration = Duration::from_secs(2);

/// Longest single sleep while waiting out the placeholder delay.
const PLACEHOLDER_STEP: Duration = Duration::from_millis(50);

/// Outcome reported when no engine is available.
pub const PLACEHOLDER_TRANSCRIPT: &str = "hello world (placeholder)";

/// Errors that abort a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("error reading audio file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audio file too small ({0} bytes)")]
    FileTooSmall(usize),

    #[error("error writing audio: {0}")]
    Session(#[from] SessionError),
}

/// Pacing of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    pub chunk_interval: Duration,    // Sleep after each fed chunk
    pub drain_attempts: usize,       // Poll cap after the last chunk
    pub drain_interval: Duration,    // Sleep between drain polls
    pub placeholder_delay: Duration, // Simulated run without an engine
}

impl ReplayOptions {
    /// Real-time pacing: one chunk duration between chunks.
    pub fn realtime(config: &SessionConfig) -> Self {
        Self {
            chunk_interval: Duration::from_millis(u64::from(config.chunk_duration_ms)),
            drain_attempts: DRAIN_ATTEMPTS,
            drain_interval: DRAIN_INTERVAL,
            placeholder_delay: PLACEHOLDER_DELAY,
        }
    }
}

/// What a replay produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub payload_bytes: usize,    // Audio bytes after the header
    pub chunks: usize,           // Chunks fed to the session
    pub finals: Vec<String>,     // Final lines seen while feeding
    pub outcome: Option<String>, // Final result found while draining
    pub interrupted: bool,       // Stopped by the shutdown flag
}

/// Drives a session from an audio file.
pub struct FileReplay<'a> {
    session: &'a Session,
    config: &'a SessionConfig,
    options: ReplayOptions,
    shutdown: Arc<AtomicBool>,
}

impl<'a> FileReplay<'a> {
    pub fn new(session: &'a Session, config: &'a SessionConfig, options: ReplayOptions) -> Self {
        Self { session, config, options, shutdown: Arc::new(AtomicBool::new(false)) }
    }

    /// Stop between chunks and drain polls once `flag` is set.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    /// Replay `path` through the session, rendering transcripts to `sink`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file is shorter than the header
    /// - The session rejects audio (closed stream)
    pub fn run(&self, path: &Path, sink: &mut dyn TranscriptSink) -> Result<ReplaySummary, ReplayError> {
        if self.session.is_degraded() {
            return Ok(self.run_placeholder(path, sink));
        }

        let data = fs::read(path).map_err(|source| ReplayError::Read { path: path.to_path_buf(), source })?;
        let payload = strip_header(&data).ok_or(ReplayError::FileTooSmall(data.len()))?;

        info!("📊 Recognizing {} ({} bytes of audio)...", path.display(), payload.len());

        let mut summary = ReplaySummary { payload_bytes: payload.len(), ..Default::default() };

        // chunks() panics on zero
        let chunk_bytes = self.config.chunk_bytes().max(1);

        for (index, chunk) in payload.chunks(chunk_bytes).enumerate() {
            if self.shutdown_requested() {
                summary.interrupted = true;
                return Ok(summary);
            }

            self.session.feed(chunk)?;
            summary.chunks += 1;

            match self.session.poll_result() {
                Ok(hypothesis) => self.render(hypothesis, sink, &mut summary),
                Err(e) => warn!("No result for chunk {}: {}", index, e),
            }

            thread::sleep(self.options.chunk_interval);
        }

        debug!("Fed {} chunks of up to {} bytes", summary.chunks, chunk_bytes);
        self.drain(sink, &mut summary);
        Ok(summary)
    }

    fn render(&self, hypothesis: Hypothesis, sink: &mut dyn TranscriptSink, summary: &mut ReplaySummary) {
        if hypothesis.text.is_empty() {
            return;
        }

        if hypothesis.is_final {
            sink.final_line(&hypothesis.text);
            summary.finals.push(hypothesis.text);
        } else {
            sink.interim(&hypothesis.text);
        }
    }

    /// Poll until a final result appears or the attempt cap is reached.
    fn drain(&self, sink: &mut dyn TranscriptSink, summary: &mut ReplaySummary) {
        info!("⏳ Waiting for final result...");

        for attempt in 0..self.options.drain_attempts {
            if self.shutdown_requested() {
                summary.interrupted = true;
                return;
            }

            let hypothesis = match self.session.poll_result() {
                Ok(hypothesis) => hypothesis,
                Err(e) => {
                    warn!("Stopped waiting for final result: {}", e);
                    return;
                }
            };

            if hypothesis.is_final && !hypothesis.text.is_empty() {
                debug!("Final result after {} drain polls", attempt + 1);
                sink.outcome(&hypothesis.text);
                summary.outcome = Some(hypothesis.text);
                return;
            }

            if !hypothesis.text.is_empty() {
                sink.interim(&hypothesis.text);
            }

            thread::sleep(self.options.drain_interval);
        }

        debug!("No final result after {} drain polls", self.options.drain_attempts);
    }

    fn run_placeholder(&self, path: &Path, sink: &mut dyn TranscriptSink) -> ReplaySummary {
        info!("📊 Placeholder recognizer: processing {}", path.display());

        let mut remaining = self.options.placeholder_delay;
        while !remaining.is_zero() {
            if self.shutdown_requested() {
                return ReplaySummary { interrupted: true, ..Default::default() };
            }
            let step = remaining.min(PLACEHOLDER_STEP);
            thread::sleep(step);
            remaining -= step;
        }

        sink.outcome(PLACEHOLDER_TRANSCRIPT);
        ReplaySummary { outcome: Some(PLACEHOLDER_TRANSCRIPT.to_string()), ..Default::default() }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
