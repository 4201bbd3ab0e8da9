//! Human-readable progress lines, kept apart from diagnostics

use std::sync::Mutex;

/// Sink for progress lines such as `Verifying RS256 (reference -> target)...`
pub trait ProgressReporter: Send + Sync {
    /// Emit one line.
    fn report(&self, line: &str);
}

/// Prints each line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ProgressReporter for StdoutProgress {
    fn report(&self, line: &str) {
        println!("{line}");
    }
}

/// Discards all lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn report(&self, _line: &str) {}
}

/// Keeps lines in memory for inspection.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<String>>,
}

impl RecordingProgress {
    /// Lines reported so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
