//! Decoding engine boundary used by the recognition session.

use thiserror::Error;

use super::artifacts::ModelArtifacts;
use crate::config::SessionConfig;

/// Errors raised while opening or driving a recognition session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// One of the required model files is absent.
    #[error("model file not found: {0}")]
    MissingModelArtifact(std::path::PathBuf),

    /// The engine returned no handle for the recognizer or stream.
    #[error("failed to create {0}")]
    EngineConstructionFailed(&'static str),

    /// Audio was fed after the stream was released.
    #[error("stream is closed")]
    StreamClosed,

    /// A result was requested after the recognizer or stream was released.
    #[error("recognizer or stream is not available")]
    EngineUnavailable,
}

/// A streaming recognizer with its single input stream.
///
/// Dropping the engine releases the stream first, then the recognizer.
pub trait DecodingEngine: Send {
    /// Append normalized samples to the stream.
    fn accept_waveform(&mut self, sample_rate: u32, samples: &[f32]);

    /// Whether enough audio is buffered for one decode step.
    fn is_ready(&self) -> bool;

    /// Run one decode step.
    fn decode(&mut self);

    /// Current hypothesis text, if the engine produced one.
    fn result(&self) -> Option<String>;

    /// Whether the current utterance has ended.
    fn is_endpoint(&self) -> bool;

    /// Clear the decoder state for this stream.
    fn reset(&mut self);
}

/// Engine configuration: session settings plus the fixed streaming defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub artifacts: ModelArtifacts,
    pub sample_rate: u32,
    pub feature_dim: u32,
    pub model_type: &'static str,
    pub decoding_method: &'static str,
    pub max_active_paths: i32,
    pub enable_endpoint: bool,
    pub num_threads: i32,
    pub provider: &'static str,
    pub debug: bool,
}

impl EngineConfig {
    /// Locate model files and apply greedy single-thread CPU defaults.
    ///
    /// # Errors
    /// Returns `MissingModelArtifact` if any required model file is absent.
    pub fn from_session(config: &SessionConfig) -> Result<Self, SessionError> {
        let artifacts = ModelArtifacts::locate(&config.model_path)?;

        Ok(Self {
            artifacts,
            sample_rate: config.sample_rate,
            feature_dim: config.feature_dim,
            model_type: "zipformer2",
            decoding_method: "greedy_search",
            max_active_paths: 4,
            enable_endpoint: true,
            num_threads: 1,
            provider: "cpu",
            debug: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::testing::model_dir;

    #[test]
    fn test_engine_config_defaults() {
        let dir = model_dir();
        let session = SessionConfig { model_path: dir.path().to_path_buf(), sample_rate: 16000, feature_dim: 80, chunk_duration_ms: 100 };

        let config = EngineConfig::from_session(&session).unwrap();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.feature_dim, 80);
        assert_eq!(config.decoding_method, "greedy_search");
        assert_eq!(config.max_active_paths, 4);
        assert!(config.enable_endpoint);
        assert_eq!(config.num_threads, 1);
        assert_eq!(config.provider, "cpu");
        assert_eq!(config.artifacts.encoder, dir.path().join("am-onnx").join("encoder.onnx"));
    }

    #[test]
    fn test_engine_config_requires_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionConfig { model_path: dir.path().to_path_buf(), sample_rate: 16000, feature_dim: 80, chunk_duration_ms: 100 };

        let err = EngineConfig::from_session(&session).unwrap_err();
        assert!(matches!(err, SessionError::MissingModelArtifact(_)));
    }
}
