//! Command-line interface

use crate::{config::HarnessConfig, error::ConformanceResult};
use clap::Parser;
use crossjwt_jwt::Algorithm;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "crossjwt")]
#[command(about = "Cross-check two JWT engines across the JWS algorithm matrix")]
pub struct Cli {
    /// Number of full passes over the algorithm matrix (default: 10)
    #[arg(value_name = "ITERATIONS")]
    pub iterations: Option<u32>,

    /// Same as the positional ITERATIONS
    #[arg(long = "iterations", value_name = "N", conflicts_with = "iterations")]
    pub iterations_flag: Option<u32>,

    /// JSON config file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only run this algorithm (repeatable), e.g. `--alg RS256 --alg EdDSA`
    #[arg(long = "alg", value_name = "ALG")]
    pub algorithms: Vec<Algorithm>,

    /// RSA modulus length in bits (minimum 2048)
    #[arg(long = "rsa-bits", value_name = "BITS")]
    pub rsa_bits: Option<usize>,

    /// Token lifetime in seconds
    #[arg(long = "ttl-secs", value_name = "SECS")]
    pub ttl_secs: Option<u64>,

    /// Subject stamped into every token
    #[arg(long)]
    pub subject: Option<String>,

    /// Skip the unverified EdDSA decode at the start of each iteration
    #[arg(long)]
    pub no_untrusted_demo: bool,
}

impl Cli {
    /// Merge defaults, the optional config file, and flags, in that order.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be loaded or the result is invalid.
    pub fn resolve(self) -> ConformanceResult<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(iterations) = self.iterations.or(self.iterations_flag) {
            config.iterations = iterations;
        }
        if !self.algorithms.is_empty() {
            let mut algorithms = Vec::with_capacity(self.algorithms.len());
            for algorithm in self.algorithms {
                if !algorithms.contains(&algorithm) {
                    algorithms.push(algorithm);
                }
            }
            config.algorithms = algorithms;
        }
        if let Some(bits) = self.rsa_bits {
            config.rsa_modulus_bits = bits;
        }
        if let Some(ttl) = self.ttl_secs {
            config.token_ttl_secs = ttl;
        }
        if let Some(subject) = self.subject {
            config.subject = subject;
        }
        if self.no_untrusted_demo {
            config.untrusted_demo = false;
        }

        config.validate()?;
        Ok(config)
    }
}
