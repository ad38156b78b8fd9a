//! Streaming transducer recognizer backed by the sherpa-onnx C API.

use std::ffi::{CStr, CString};
use std::mem;
use std::path::Path;

use sherpa_rs_sys::{
    SherpaOnnxCreateOnlineRecognizer, SherpaOnnxCreateOnlineStream, SherpaOnnxDecodeOnlineStream, SherpaOnnxDestroyOnlineRecognizer,
    SherpaOnnxDestroyOnlineRecognizerResult, SherpaOnnxDestroyOnlineStream, SherpaOnnxGetOnlineStreamResult, SherpaOnnxIsOnlineStreamReady,
    SherpaOnnxOnlineRecognizer, SherpaOnnxOnlineRecognizerConfig, SherpaOnnxOnlineStream, SherpaOnnxOnlineStreamAcceptWaveform,
    SherpaOnnxOnlineStreamIsEndpoint, SherpaOnnxOnlineStreamReset,
};
use tracing::{debug, info, warn};

use super::engine::{DecodingEngine, EngineConfig, SessionError};
use crate::config::SessionConfig;

/// Online recognizer plus its stream.
///
/// `Drop` releases the stream before the recognizer.
pub struct SherpaEngine {
    stream: *const SherpaOnnxOnlineStream,         // Input stream (owned)
    recognizer: *const SherpaOnnxOnlineRecognizer, // Recognizer (owned)
}

// Both handles are only touched through `&mut self` or under the session lock.
unsafe impl Send for SherpaEngine {}

impl SherpaEngine {
    /// Locate model files and build a live engine for a session.
    ///
    /// # Errors
    /// Returns `MissingModelArtifact` or `EngineConstructionFailed`.
    pub fn open(config: &SessionConfig) -> Result<Self, SessionError> {
        let engine_config = EngineConfig::from_session(config)?;
        Self::new(&engine_config)
    }

    /// Create the recognizer and its stream.
    ///
    /// # Errors
    /// Returns `EngineConstructionFailed` if either handle comes back null. A recognizer
    /// created before a failed stream is released.
    pub fn new(config: &EngineConfig) -> Result<Self, SessionError> {
        let artifacts = &config.artifacts;
        info!("Encoder path: {}", artifacts.encoder.display());
        info!("Decoder path: {}", artifacts.decoder.display());
        info!("Joiner path: {}", artifacts.joiner.display());
        info!("Tokens path: {}", artifacts.tokens.display());

        // Kept alive until the recognizer has copied them.
        let encoder = path_cstring(&artifacts.encoder)?;
        let decoder = path_cstring(&artifacts.decoder)?;
        let joiner = path_cstring(&artifacts.joiner)?;
        let tokens = path_cstring(&artifacts.tokens)?;
        let model_type = str_cstring(config.model_type)?;
        let provider = str_cstring(config.provider)?;
        let decoding_method = str_cstring(config.decoding_method)?;

        // Zeroed fields fall back to sherpa-onnx defaults (endpoint rules, hotwords, ...).
        let mut raw: SherpaOnnxOnlineRecognizerConfig = unsafe { mem::zeroed() };
        raw.feat_config.sample_rate = config.sample_rate as i32;
        raw.feat_config.feature_dim = config.feature_dim as i32;
        raw.model_config.transducer.encoder = encoder.as_ptr();
        raw.model_config.transducer.decoder = decoder.as_ptr();
        raw.model_config.transducer.joiner = joiner.as_ptr();
        raw.model_config.tokens = tokens.as_ptr();
        raw.model_config.model_type = model_type.as_ptr();
        raw.model_config.num_threads = config.num_threads;
        raw.model_config.provider = provider.as_ptr();
        raw.model_config.debug = i32::from(config.debug);
        raw.decoding_method = decoding_method.as_ptr();
        raw.max_active_paths = config.max_active_paths;
        raw.enable_endpoint = i32::from(config.enable_endpoint);

        info!("Creating OnlineRecognizer...");

        let recognizer = unsafe { SherpaOnnxCreateOnlineRecognizer(&raw) };
        if recognizer.is_null() {
            return Err(SessionError::EngineConstructionFailed("recognizer"));
        }

        let stream = unsafe { SherpaOnnxCreateOnlineStream(recognizer) };
        if stream.is_null() {
            unsafe { SherpaOnnxDestroyOnlineRecognizer(recognizer) };
            return Err(SessionError::EngineConstructionFailed("stream"));
        }

        info!("Online recognizer initialized successfully");
        Ok(Self { stream, recognizer })
    }
}

impl DecodingEngine for SherpaEngine {
    fn accept_waveform(&mut self, sample_rate: u32, samples: &[f32]) {
        let Some((rate, len)) = waveform_args(sample_rate, samples.len()) else {
            warn!("Skipping waveform: {} samples at {} Hz exceed the engine's limits", samples.len(), sample_rate);
            return;
        };
        unsafe { SherpaOnnxOnlineStreamAcceptWaveform(self.stream, rate, samples.as_ptr(), len) };
    }

    fn is_ready(&self) -> bool {
        unsafe { SherpaOnnxIsOnlineStreamReady(self.recognizer, self.stream) != 0 }
    }

    fn decode(&mut self) {
        unsafe { SherpaOnnxDecodeOnlineStream(self.recognizer, self.stream) };
    }

    fn result(&self) -> Option<String> {
        let result = unsafe { SherpaOnnxGetOnlineStreamResult(self.recognizer, self.stream) };
        if result.is_null() {
            return None;
        }

        unsafe {
            let text_ptr = (*result).text;
            let text = if text_ptr.is_null() { None } else { Some(CStr::from_ptr(text_ptr).to_string_lossy().into_owned()) };
            SherpaOnnxDestroyOnlineRecognizerResult(result);
            text
        }
    }

    fn is_endpoint(&self) -> bool {
        unsafe { SherpaOnnxOnlineStreamIsEndpoint(self.recognizer, self.stream) != 0 }
    }

    fn reset(&mut self) {
        unsafe { SherpaOnnxOnlineStreamReset(self.recognizer, self.stream) };
    }
}

impl Drop for SherpaEngine {
    fn drop(&mut self) {
        unsafe {
            SherpaOnnxDestroyOnlineStream(self.stream);
            SherpaOnnxDestroyOnlineRecognizer(self.recognizer);
        }
        debug!("Online recognizer released");
    }
}

/// Sample rate and sample count as the C API's `int32_t`, or `None` if either overflows.
fn waveform_args(sample_rate: u32, len: usize) -> Option<(i32, i32)> {
    Some((i32::try_from(sample_rate).ok()?, i32::try_from(len).ok()?))
}

fn path_cstring(path: &Path) -> Result<CString, SessionError> {
    CString::new(path.to_string_lossy().as_bytes()).map_err(|_| SessionError::EngineConstructionFailed("recognizer config"))
}

fn str_cstring(value: &str) -> Result<CString, SessionError> {
    CString::new(value).map_err(|_| SessionError::EngineConstructionFailed("recognizer config"))
}
