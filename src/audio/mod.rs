//! Audio input module: raw PCM helpers and the file-driven audio source.

pub mod pcm;
mod render;
mod replay;

pub use render::{ConsoleSink, TranscriptSink};
pub use replay::{FileReplay, ReplayError, ReplayOptions, ReplaySummary};
