//! Speech-to-text module using the sherpa-onnx online recognizer.
//!
//! Provides the streaming recognition session and its decoding engine.

mod artifacts;
mod engine;
mod session;
mod sherpa;

#[cfg(test)]
pub(crate) mod testing;

pub use artifacts::ModelArtifacts;
pub use engine::SessionError;
pub use session::{Hypothesis, Session};
