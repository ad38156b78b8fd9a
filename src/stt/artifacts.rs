//! Model directory layout for the streaming transducer.

use std::path::{Path, PathBuf};

use super::engine::SessionError;

/// Paths of the four files a live recognizer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifacts {
    pub encoder: PathBuf,
    pub decoder: PathBuf,
    pub joiner: PathBuf,
    pub tokens: PathBuf,
}

impl ModelArtifacts {
    /// Expected artifact paths under `model_dir`, without touching the filesystem.
    pub fn expected(model_dir: &Path) -> Self {
        let am = model_dir.join("am-onnx");
        Self {
            encoder: am.join("encoder.onnx"),
            decoder: am.join("decoder.onnx"),
            joiner: am.join("joiner.onnx"),
            tokens: model_dir.join("lang").join("tokens.txt"),
        }
    }

    /// Resolve the artifact paths and check that every file exists.
    ///
    /// # Errors
    /// Returns `MissingModelArtifact` naming the first absent file.
    pub fn locate(model_dir: &Path) -> Result<Self, SessionError> {
        let artifacts = Self::expected(model_dir);
        if let Some(missing) = artifacts.missing().into_iter().next() {
            return Err(SessionError::MissingModelArtifact(missing));
        }
        Ok(artifacts)
    }

    /// Every expected file that does not exist, in encoder/decoder/joiner/tokens order.
    pub fn missing(&self) -> Vec<PathBuf> {
        self.paths().into_iter().filter(|path| !path.is_file()).map(Path::to_path_buf).collect()
    }

    fn paths(&self) -> [&Path; 4] {
        [&self.encoder, &self.decoder, &self.joiner, &self.tokens]
    }
}
