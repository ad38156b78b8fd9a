//! Application configuration: CLI arguments and the JSON settings file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Command line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "streaming-asr")]
#[command(author, version, about = "Streams an audio file through an online speech recognizer", long_about = None)]
pub struct AppConfig {
    /// Path to the JSON configuration file
    #[arg(long, short = 'c', env = "ASR_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Audio file to recognize (overrides `test_wav` from the configuration file)
    #[arg(long, short = 'w')]
    pub wav: Option<PathBuf>,

    /// Verify model files and the audio file, then exit
    #[arg(long)]
    pub check: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Load the settings file and apply command line overrides.
    pub fn load_file_config(&self) -> Result<FileConfig> {
        let mut file_config = FileConfig::load(&self.config)?;
        if let Some(ref wav) = self.wav {
            file_config.test_wav = wav.clone();
        }
        Ok(file_config)
    }
}

/// Settings read from the JSON configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Root directory holding `am-onnx/` and `lang/`
    pub model_path: PathBuf,
    /// Audio file replayed through the recognizer
    pub test_wav: PathBuf,
    /// Sample rate of the PCM payload (Hz)
    pub sample_rate: u32,
    /// Feature dimension expected by the acoustic model
    pub feature_dim: u32,
    /// Duration of each fed chunk (ms)
    pub chunk_ms: u32,
}

impl FileConfig {
    /// Read and parse a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Validate numeric fields before any session is created.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            anyhow::bail!("Sample rate must be positive");
        }

        if self.feature_dim == 0 {
            anyhow::bail!("Feature dimension must be positive");
        }

        if self.chunk_ms == 0 {
            anyhow::bail!("Chunk duration must be positive");
        }

        if self.session_config().chunk_bytes() < 2 {
            anyhow::bail!("Chunk duration of {}ms holds no samples at {} Hz", self.chunk_ms, self.sample_rate);
        }

        Ok(())
    }

    /// Build the immutable session configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model_path: self.model_path.clone(),
            sample_rate: self.sample_rate,
            feature_dim: self.feature_dim,
            chunk_duration_ms: self.chunk_ms,
        }
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("🔧 Configuration:");
        info!("  Model: {}", self.model_path.display());
        info!("  Audio file: {}", self.test_wav.display());
        info!("  Sample rate: {} Hz", self.sample_rate);
        info!("  Feature dim: {}", self.feature_dim);
        info!("  Chunk size: {} ms", self.chunk_ms);
    }
}

/// Settings consumed by a recognition session and the file replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub model_path: PathBuf,
    pub sample_rate: u32,
    pub feature_dim: u32,
    pub chunk_duration_ms: u32,
}

impl SessionConfig {
    /// Bytes of 16-bit mono PCM in one chunk.
    pub fn chunk_bytes(&self) -> usize {
        (u64::from(self.sample_rate) * 2 * u64::from(self.chunk_duration_ms) / 1000) as usize
    }
}
