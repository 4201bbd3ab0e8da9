//! Harness configuration: defaults, optional JSON file, CLI overrides

use crate::error::{ConformanceError, ConformanceResult};
use chrono::Duration;
use crossjwt_jwt::{Algorithm, ClaimsSet, KeyProvider, SignOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

/// Settings for one conformance run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Full passes over the algorithm matrix
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// RSA modulus length for generated keys
    #[serde(default = "default_rsa_modulus_bits")]
    pub rsa_modulus_bits: usize,
    /// Lifetime stamped into `exp`, in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// `sub` stamped into every token
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Algorithms to exercise, in order
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,
    /// Payload every token starts from
    #[serde(default = "default_seed")]
    pub seed: Value,
    /// Decode one EdDSA token without verification at the start of each iteration
    #[serde(default = "default_untrusted_demo")]
    pub untrusted_demo: bool,
}

fn default_iterations() -> u32 {
    10
}

fn default_rsa_modulus_bits() -> usize {
    KeyProvider::MIN_RSA_MODULUS_BITS
}

fn default_token_ttl_secs() -> u64 {
    3600 // 1 hour
}

fn default_subject() -> String {
    "john.doe@example.com".to_string()
}

fn default_algorithms() -> Vec<Algorithm> {
    Algorithm::ALL.to_vec()
}

fn default_seed() -> Value {
    json!({ "name": "John Doe", "admin": false })
}

fn default_untrusted_demo() -> bool {
    true
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            rsa_modulus_bits: default_rsa_modulus_bits(),
            token_ttl_secs: default_token_ttl_secs(),
            subject: default_subject(),
            algorithms: default_algorithms(),
            seed: default_seed(),
            untrusted_demo: default_untrusted_demo(),
        }
    }
}

impl HarnessConfig {
    /// Longest accepted token lifetime (100 years).
    pub const MAX_TOKEN_TTL_SECS: u64 = 100 * 365 * 24 * 3600;

    /// Load a JSON config file. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> ConformanceResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConformanceError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            ConformanceError::Config(format!("invalid config {}: {e}", path.display()))
        })
    }

    /// Reject settings the harness cannot run with.
    ///
    /// # Errors
    /// Returns `Config` describing the first invalid setting.
    pub fn validate(&self) -> ConformanceResult<()> {
        if self.iterations == 0 {
            return Err(ConformanceError::Config(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.rsa_modulus_bits < KeyProvider::MIN_RSA_MODULUS_BITS {
            return Err(ConformanceError::Config(format!(
                "rsa_modulus_bits must be at least {}, got {}",
                KeyProvider::MIN_RSA_MODULUS_BITS,
                self.rsa_modulus_bits
            )));
        }
        if self.token_ttl_secs == 0 {
            return Err(ConformanceError::Config(
                "token_ttl_secs must be positive".to_string(),
            ));
        }
        self.token_ttl()?;
        if self.algorithms.is_empty() {
            return Err(ConformanceError::Config(
                "at least one algorithm is required".to_string(),
            ));
        }
        self.seed_claims()?;
        Ok(())
    }

    /// Token lifetime as a duration.
    ///
    /// # Errors
    /// Returns `Config` above [`Self::MAX_TOKEN_TTL_SECS`].
    pub fn token_ttl(&self) -> ConformanceResult<Duration> {
        Some(self.token_ttl_secs)
            .filter(|secs| *secs <= Self::MAX_TOKEN_TTL_SECS)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                ConformanceError::Config(format!(
                    "token_ttl_secs out of range: {}",
                    self.token_ttl_secs
                ))
            })
    }

    /// Seed payload as a claims set.
    ///
    /// # Errors
    /// Returns `Config` if the seed is not a JSON object.
    pub fn seed_claims(&self) -> ConformanceResult<ClaimsSet> {
        ClaimsSet::from_value(self.seed.clone())
            .map_err(|_| ConformanceError::Config("seed must be a JSON object".to_string()))
    }

    /// Stamping options shared by both engines.
    ///
    /// # Errors
    /// Returns `Config` if the TTL is out of range.
    pub fn sign_options(&self) -> ConformanceResult<SignOptions> {
        Ok(SignOptions::default()
            .with_ttl(self.token_ttl()?)
            .with_subject(self.subject.clone()))
    }

    /// Key provider for the configured RSA modulus.
    ///
    /// # Errors
    /// Returns `Config` below the minimum modulus.
    pub fn key_provider(&self) -> ConformanceResult<KeyProvider> {
        KeyProvider::new(self.rsa_modulus_bits).map_err(|e| ConformanceError::Config(e.to_string()))
    }
}
