//! Shared infrastructure for the crossjwt crates.
//!
//! Currently only the `env_logger` bootstrap and the structured log lines the
//! conformance runner emits.

pub mod logging;

pub use logging::LoggingTransformer;
