//! Harness-level errors

use crate::orchestrator::{Direction, Stage};
use crossjwt_jwt::{Algorithm, ClaimsDiff, JwtError};

/// Result type for harness operations
pub type ConformanceResult<T> = Result<T, ConformanceError>;

/// First failure of a conformance run
#[derive(Debug, thiserror::Error)]
pub enum ConformanceError {
    /// An engine or the key provider rejected an operation
    #[error("iteration {iteration}: {algorithm}{} failed at {stage}: {source}", direction_label(.direction))]
    Jwt {
        /// 1-based iteration number
        iteration: u32,
        /// Algorithm under test
        algorithm: Algorithm,
        /// Direction under test, if the stage belongs to one
        direction: Option<Direction>,
        /// Stage that failed
        stage: Stage,
        /// Underlying engine error
        source: JwtError,
    },
    /// Verified claims differ from the expected claims
    #[error("iteration {iteration}: {algorithm} ({direction}) returned unexpected claims\n{diff}")]
    ClaimsMismatch {
        /// 1-based iteration number
        iteration: u32,
        /// Algorithm under test
        algorithm: Algorithm,
        /// Direction under test
        direction: Direction,
        /// Expected vs actual claims
        diff: ClaimsDiff,
    },
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// A blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl ConformanceError {
    /// Short name of the error kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ConformanceError::Jwt { source, .. } => source.kind(),
            ConformanceError::ClaimsMismatch { .. } => "ClaimsMismatch",
            ConformanceError::Config(_) => "Config",
            ConformanceError::Task(_) => "Task",
        }
    }
}

fn direction_label(direction: &Option<Direction>) -> String {
    direction.map(|d| format!(" ({d})")).unwrap_or_default()
}
