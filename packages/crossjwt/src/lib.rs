//! Cross-implementation JWT conformance harness.
//!
//! Generates fresh keys per algorithm, signs with one engine, verifies with
//! the other in both directions, and compares the claims that come back.
//! The first failure stops the run.

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod progress;

pub use config::HarnessConfig;
pub use error::{ConformanceError, ConformanceResult};
pub use orchestrator::{Direction, Orchestrator, RunReport, Stage};
pub use progress::{ProgressReporter, RecordingProgress, SilentProgress, StdoutProgress};
