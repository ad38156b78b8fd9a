//! Setup verification for `--check`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::config::FileConfig;
use crate::stt::ModelArtifacts;

/// Entries shown per model sub-directory.
const LISTED_CHILDREN: usize = 3;

/// Result of checking the model directory and audio file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub missing: Vec<PathBuf>,      // Required files that do not exist
    pub audio_size: Option<u64>,    // Size of the audio file in bytes
    pub model_listing: Vec<String>, // Top-level entries with a few children each
}

impl SetupReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check the model artifacts and the audio file named by the configuration.
pub fn check(config: &FileConfig) -> SetupReport {
    let mut missing = ModelArtifacts::expected(&config.model_path).missing();

    let audio_size = fs::metadata(&config.test_wav).ok().filter(|m| m.is_file()).map(|m| m.len());
    if audio_size.is_none() {
        missing.push(config.test_wav.clone());
    }

    let model_listing = list_model_dir(&config.model_path).unwrap_or_default();

    SetupReport { missing, audio_size, model_listing }
}

/// Log a setup report.
pub fn log_report(config: &FileConfig, report: &SetupReport) {
    for path in &report.missing {
        error!("❌ Not found: {}", path.display());
    }

    if !report.model_listing.is_empty() {
        info!("📁 Model contents:");
        for line in &report.model_listing {
            info!("  {}", line);
        }
    }

    if let Some(size) = report.audio_size {
        info!("✅ Audio file: {} ({:.1} KB)", config.test_wav.display(), size as f64 / 1024.0);
    }

    if report.is_ok() {
        info!("✅ Model found: {}", config.model_path.display());
    }
}

/// List top-level entries of the model directory, with the first few children of each sub-directory.
fn list_model_dir(model_dir: &Path) -> Result<Vec<String>> {
    list_with(model_dir, sorted_entries)
}

/// An unreadable sub-directory is marked in place; the rest of the listing is kept.
fn list_with<F>(model_dir: &Path, read_dir: F) -> Result<Vec<String>>
where
    F: Fn(&Path) -> Result<Vec<PathBuf>>,
{
    let mut lines = Vec::new();

    for entry in read_dir(model_dir)? {
        let name = entry.file_name().unwrap_or_default().to_string_lossy().into_owned();
        if entry.is_dir() {
            lines.push(format!("📂 {}/", name));
            match read_dir(&entry) {
                Ok(children) => {
                    for child in children.into_iter().take(LISTED_CHILDREN) {
                        lines.push(format!("   📄 {}", child.file_name().unwrap_or_default().to_string_lossy()));
                    }
                }
                Err(e) => {
                    debug!("{:#}", e);
                    lines.push("   ⚠️  (unreadable)".to_string());
                }
            }
        } else {
            lines.push(format!("📄 {}", name));
        }
    }

    Ok(lines)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::testing::model_dir;

    fn config(model_path: &Path, test_wav: PathBuf) -> FileConfig {
        FileConfig { model_path: model_path.to_path_buf(), test_wav, sample_rate: 16000, feature_dim: 80, chunk_ms: 100 }
    }

    #[test]
    fn test_complete_setup() {
        let dir = model_dir();
        let wav = dir.path().join("test.wav");
        fs::write(&wav, vec![0u8; 2048]).unwrap();

        let report = check(&config(dir.path(), wav));

        assert!(report.is_ok());
        assert_eq!(report.audio_size, Some(2048));
        assert_eq!(
            report.model_listing,
            vec!["📂 am-onnx/", "   📄 decoder.onnx", "   📄 encoder.onnx", "   📄 joiner.onnx", "📂 lang/", "   📄 tokens.txt", "📄 test.wav"]
        );
    }

    #[test]
    fn test_missing_files_are_reported() {
        let dir = model_dir();
        fs::remove_file(dir.path().join("lang").join("tokens.txt")).unwrap();
        let wav = dir.path().join("absent.wav");

        let report = check(&config(dir.path(), wav.clone()));

        assert!(!report.is_ok());
        assert_eq!(report.missing, vec![dir.path().join("lang").join("tokens.txt"), wav]);
        assert_eq!(report.audio_size, None);
    }

    #[test]
    fn test_missing_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        let report = check(&config(&dir.path().join("models"), dir.path().join("a.wav")));

        assert_eq!(report.missing.len(), 5);
        assert!(report.model_listing.is_empty());
    }

    #[test]
    fn test_unreadable_subdirectory_keeps_listing() {
        let dir = model_dir();
        let lang = dir.path().join("lang");

        let lines = list_with(dir.path(), |path| {
            if path == lang.as_path() {
                anyhow::bail!("Failed to read {}", path.display());
            }
            sorted_entries(path)
        })
        .unwrap();

        assert_eq!(
            lines,
            vec!["📂 am-onnx/", "   📄 decoder.onnx", "   📄 encoder.onnx", "   📄 joiner.onnx", "📂 lang/", "   ⚠️  (unreadable)"]
        );
    }
}
