//! Streaming recognition session.
//!
//! Owns one decoding engine (or none, when the engine could not be built), converts raw
//! PCM bytes into normalized samples and serializes every engine call behind one lock.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::engine::{DecodingEngine, SessionError};
use super::sherpa::SherpaEngine;
use crate::audio::pcm::pcm16_le_to_f32;
use crate::config::SessionConfig;

/// One poll of the recognizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hypothesis {
    pub text: String,
    pub is_final: bool,
}

/// Chosen once when the session is opened.
enum SessionState {
    /// Engine slot, cleared exactly once by `close`.
    Live(Mutex<Option<Box<dyn DecodingEngine>>>),
    /// No engine available; every operation is a successful no-op.
    Degraded,
}

/// Streaming recognition session over a single audio stream.
pub struct Session {
    state: SessionState,
    sample_rate: u32,
}

impl Session {
    /// Open a session backed by the sherpa-onnx online recognizer.
    ///
    /// Never fails: if the model files are missing or the engine refuses to start, the
    /// session runs in degraded mode.
    pub fn open(config: &SessionConfig) -> Self {
        Self::open_with(config, SherpaEngine::open)
    }

    /// Open a session with a custom engine builder, degrading if the builder fails.
    pub fn open_with<E, F>(config: &SessionConfig, build: F) -> Self
    where
        E: DecodingEngine + 'static,
        F: FnOnce(&SessionConfig) -> Result<E, SessionError>,
    {
        info!("Initializing speech recognizer from {}", config.model_path.display());

        match build(config) {
            Ok(engine) => Self::with_engine(engine, config.sample_rate),
            Err(e) => {
                warn!("⚠️  Speech engine not loaded ({}), using placeholder recognizer", e);
                Self::degraded(config.sample_rate)
            }
        }
    }

    /// Wrap an already constructed engine.
    pub fn with_engine<E: DecodingEngine + 'static>(engine: E, sample_rate: u32) -> Self {
        Self { state: SessionState::Live(Mutex::new(Some(Box::new(engine)))), sample_rate }
    }

    /// A session without an engine.
    pub fn degraded(sample_rate: u32) -> Self {
        Self { state: SessionState::Degraded, sample_rate }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.state, SessionState::Degraded)
    }

    /// Feed raw little-endian 16-bit PCM bytes. A trailing odd byte is dropped.
    ///
    /// # Errors
    /// Returns `StreamClosed` if the session was closed.
    pub fn feed(&self, pcm: &[u8]) -> Result<(), SessionError> {
        let SessionState::Live(slot) = &self.state else {
            return Ok(());
        };

        let mut slot = slot.lock();
        let engine = slot.as_mut().ok_or(SessionError::StreamClosed)?;

        let samples = pcm16_le_to_f32(pcm);
        engine.accept_waveform(self.sample_rate, &samples);
        Ok(())
    }

    /// Decode if possible and return the current hypothesis.
    ///
    /// A final hypothesis with text resets the decoder, so the next poll starts a new
    /// utterance.
    ///
    /// # Errors
    /// Returns `EngineUnavailable` if the session was closed.
    pub fn poll_result(&self) -> Result<Hypothesis, SessionError> {
        let SessionState::Live(slot) = &self.state else {
            return Ok(Hypothesis::default());
        };

        let mut slot = slot.lock();
        let engine = slot.as_mut().ok_or(SessionError::EngineUnavailable)?;

        if engine.is_ready() {
            engine.decode();
        }

        let text = engine.result().unwrap_or_default();
        let is_final = engine.is_endpoint();

        if is_final && !text.is_empty() {
            debug!("Endpoint detected, resetting stream");
            engine.reset();
        }

        Ok(Hypothesis { text, is_final })
    }

    /// Release the engine. Safe to call repeatedly.
    pub fn close(&self) {
        let SessionState::Live(slot) = &self.state else {
            return;
        };

        let mut slot = slot.lock();
        if let Some(engine) = slot.take() {
            drop(engine);
            debug!("Session closed");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
