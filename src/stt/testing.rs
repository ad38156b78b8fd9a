//! Scripted engine and model fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::fs;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use super::engine::DecodingEngine;

/// What the engine reports for one poll.
#[derive(Debug, Clone)]
pub struct Step {
    ready: bool,
    text: Option<String>,
    endpoint: bool,
}

impl Step {
    pub fn interim(text: &str) -> Self {
        Self { ready: true, text: Some(text.to_string()), endpoint: false }
    }

    pub fn endpoint(text: &str) -> Self {
        Self { ready: true, text: Some(text.to_string()), endpoint: true }
    }

    pub fn absent() -> Self {
        Self { ready: true, text: None, endpoint: false }
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Step>,
    current: Option<Step>,
    fed: Vec<(u32, Vec<f32>)>,
    decodes: usize,
    resets: usize,
    releases: usize,
}

/// Read side of a scripted engine, usable after the engine moved into a session.
#[derive(Clone)]
pub struct EngineLog(Arc<Mutex<Inner>>);

impl EngineLog {
    pub fn fed(&self) -> Vec<(u32, Vec<f32>)> {
        self.0.lock().fed.clone()
    }

    pub fn fed_bytes(&self) -> Vec<usize> {
        self.0.lock().fed.iter().map(|(_, samples)| samples.len() * 2).collect()
    }

    pub fn decodes(&self) -> usize {
        self.0.lock().decodes
    }

    pub fn resets(&self) -> usize {
        self.0.lock().resets
    }

    pub fn releases(&self) -> usize {
        self.0.lock().releases
    }
}

/// Engine that replays one `Step` per poll, then reports empty interim results.
pub struct ScriptedEngine(Arc<Mutex<Inner>>);

impl ScriptedEngine {
    pub fn new(steps: Vec<Step>) -> (Self, EngineLog) {
        let inner = Arc::new(Mutex::new(Inner { script: steps.into(), ..Default::default() }));
        (Self(inner.clone()), EngineLog(inner))
    }
}

impl DecodingEngine for ScriptedEngine {
    fn accept_waveform(&mut self, sample_rate: u32, samples: &[f32]) {
        self.0.lock().fed.push((sample_rate, samples.to_vec()));
    }

    // Every poll starts with a readiness check, so the script advances here.
    fn is_ready(&self) -> bool {
        let mut inner = self.0.lock();
        let step = inner.script.pop_front().unwrap_or_else(|| Step::interim(""));
        let ready = step.ready;
        inner.current = Some(step);
        ready
    }

    fn decode(&mut self) {
        self.0.lock().decodes += 1;
    }

    fn result(&self) -> Option<String> {
        self.0.lock().current.as_ref().and_then(|step| step.text.clone())
    }

    fn is_endpoint(&self) -> bool {
        self.0.lock().current.as_ref().is_some_and(|step| step.endpoint)
    }

    fn reset(&mut self) {
        self.0.lock().resets += 1;
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.0.lock().releases += 1;
    }
}

/// Temporary model directory holding all four required (empty) files.
pub fn model_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("am-onnx")).unwrap();
    fs::create_dir_all(dir.path().join("lang")).unwrap();
    for name in ["am-onnx/encoder.onnx", "am-onnx/decoder.onnx", "am-onnx/joiner.onnx", "lang/tokens.txt"] {
        fs::write(dir.path().join(name), b"").unwrap();
    }
    dir
}
