//! `env_logger`-based logging for the conformance runner
//!
//! Libraries log through `tracing` (with its `log` bridge); the binary
//! installs `env_logger` once via [`LoggingTransformer::init`]. Levels come
//! from `RUST_LOG`, defaulting to `info`:
//! - `RUST_LOG=debug` - include key generation and per-check lines
//! - `RUST_LOG=crossjwt_jwt=trace` - include per-token signing lines

use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Logging bootstrap and structured log lines
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (first call wins)
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .format_timestamp_micros()
                .init();

            debug!("Structured logging initialized");
        });
    }

    /// Initialize logging for tests; safe to call from every test
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log the run configuration. The subject is hashed.
    pub fn log_run_start(iterations: u32, algorithms: usize, subject: &str) {
        info!(
            "Starting conformance run: {iterations} iteration(s) x {algorithms} algorithm(s) (subject_hash: {})",
            Self::secure_hash(subject)
        );
    }

    /// Log freshly generated key material by thumbprint
    pub fn log_key_generated(algorithm: &str, thumbprint: &str, elapsed: Duration) {
        debug!("Generated {algorithm} key in {elapsed:?} (thumbprint: {thumbprint})");
    }

    /// Log a passed cross-engine check
    pub fn log_check_passed(iteration: u32, algorithm: &str, direction: &str) {
        debug!("Iteration {iteration}: {algorithm} {direction} passed");
    }

    /// Log a failed check with its error kind and message
    pub fn log_check_failed(iteration: u32, algorithm: &str, stage: &str, kind: &str, error: &str) {
        error!("Iteration {iteration}: {algorithm} failed at {stage} ({kind}): {error}");
    }

    /// Log an unverified token decode. Only the claim names are logged.
    pub fn log_untrusted_decode<'a>(algorithm: &str, claim_names: impl IntoIterator<Item = &'a str>) {
        let names: Vec<&str> = claim_names.into_iter().collect();
        warn!(
            "Decoded {algorithm} token WITHOUT verification (claims: {})",
            names.join(", ")
        );
    }

    /// Log the run summary
    pub fn log_run_summary(iterations: u32, checks: usize, elapsed: Duration) {
        info!("Conformance run passed: {iterations} iteration(s), {checks} check(s) in {elapsed:?}");
    }

    /// SHA-256 based short identifier for values that should not appear in logs
    fn secure_hash(value: &str) -> String {
        let hash = Sha256::digest(value.as_bytes());
        let hex_hash: String = hash.iter().map(|byte| format!("{byte:02x}")).collect();
        format!("#{}", &hex_hash[..12])
    }
}
