//! Transcript rendering for the file replay.

use std::io::{self, Write};

/// Receives transcripts as the replay produces them.
pub trait TranscriptSink {
    /// Provisional text; replaces the previous interim line.
    fn interim(&mut self, text: &str);

    /// Text of a completed utterance.
    fn final_line(&mut self, text: &str);

    /// Overall result of the run.
    fn outcome(&mut self, text: &str);
}

/// Prints transcripts to stdout, overwriting a single progress line for interim text.
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    // Console output is best effort; a closed stdout must not abort recognition.
    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(line);
        let _ = self.out.flush();
    }
}

impl<W: Write> TranscriptSink for ConsoleSink<W> {
    fn interim(&mut self, text: &str) {
        self.emit(format_args!("\r🔄 Interim: {:<50}", text));
    }

    fn final_line(&mut self, text: &str) {
        self.emit(format_args!("\n✅ Final: {}\n", text));
    }

    fn outcome(&mut self, text: &str) {
        self.emit(format_args!("\n🎯 Result: {}\n", text));
    }
}
