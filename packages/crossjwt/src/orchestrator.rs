//! Conformance run state machine
//!
//! For every iteration and algorithm the run walks
//! `GenerateKeys → SignReference → VerifyTarget → CompareA → SignTarget →
//! VerifyReference → CompareB → Done`. Cryptographic work runs on the
//! blocking pool, one call at a time, so the first failure pins down an
//! exact (iteration, algorithm, direction, stage).

use crate::{
    compare,
    config::HarnessConfig,
    error::{ConformanceError, ConformanceResult},
    progress::{ProgressReporter, StdoutProgress},
};
use chrono::{Duration, Utc};
use crossjwt_common::LoggingTransformer;
use crossjwt_jwt::{
    decode_unverified, Algorithm, ClaimsDiff, ClaimsSet, JwtEngine, JwtError, JwtResult, KeyMaterial,
    KeyProvider, ReferenceEngine, TargetEngine, TimeOptions, Token,
};
use std::{fmt, sync::Arc, time::Instant};

/// Position in the per-algorithm cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Decoding an EdDSA token without verification, before the matrix.
    UntrustedDecode,
    /// Fresh key material for the algorithm
    GenerateKeys,
    /// Reference engine signs the seed
    SignReference,
    /// Target engine verifies the reference token
    VerifyTarget,
    /// Target-verified claims against the expected stamped seed
    CompareA,
    /// Target engine re-signs the verified claims
    SignTarget,
    /// Reference engine verifies the target token
    VerifyReference,
    /// Reference-verified claims against the CompareA claims, `exp` excluded
    CompareB,
    /// Algorithm passed
    Done,
}

impl Stage {
    /// Following stage; `Done` and `UntrustedDecode` are terminal.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Stage::GenerateKeys => Stage::SignReference,
            Stage::SignReference => Stage::VerifyTarget,
            Stage::VerifyTarget => Stage::CompareA,
            Stage::CompareA => Stage::SignTarget,
            Stage::SignTarget => Stage::VerifyReference,
            Stage::VerifyReference => Stage::CompareB,
            Stage::CompareB | Stage::Done | Stage::UntrustedDecode => Stage::Done,
        }
    }

    /// Direction a stage belongs to.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Stage::SignReference | Stage::VerifyTarget | Stage::CompareA => {
                Some(Direction::ReferenceToTarget)
            }
            Stage::SignTarget | Stage::VerifyReference | Stage::CompareB => {
                Some(Direction::TargetToReference)
            }
            Stage::UntrustedDecode | Stage::GenerateKeys | Stage::Done => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Which engine signs and which verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Reference signs, target verifies
    ReferenceToTarget,
    /// Target signs, reference verifies
    TargetToReference,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::ReferenceToTarget => "reference -> target",
            Direction::TargetToReference => "target -> reference",
        })
    }
}

/// Summary of a passing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Iterations completed
    pub iterations: u32,
    /// Directional checks passed (two per algorithm per iteration)
    pub checks: usize,
    /// Wall-clock duration of the run
    pub elapsed: std::time::Duration,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "All checks passed: {} iteration(s), {} check(s) in {:.2?}",
            self.iterations, self.checks, self.elapsed
        )
    }
}

/// Drives both engines through the configured matrix.
pub struct Orchestrator {
    config: HarnessConfig,
    seed: ClaimsSet,
    ttl: Duration,
    keys: KeyProvider,
    reference: Arc<dyn JwtEngine>,
    target: Arc<dyn JwtEngine>,
    progress: Arc<dyn ProgressReporter>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("reference", &self.reference.name())
            .field("target", &self.target.name())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator over the built-in engines, printing progress to stdout.
    ///
    /// # Errors
    /// Returns `Config` if the configuration does not validate.
    pub fn new(config: HarnessConfig) -> ConformanceResult<Self> {
        config.validate()?;
        let options = config.sign_options()?;
        Ok(Self {
            seed: config.seed_claims()?,
            ttl: config.token_ttl()?,
            keys: config.key_provider()?,
            reference: Arc::new(ReferenceEngine::new(options.clone())),
            target: Arc::new(TargetEngine::new(options)),
            progress: Arc::new(StdoutProgress),
            config,
        })
    }

    /// Replace the engines under test. Both must stamp with the configured
    /// subject and TTL for the comparisons to hold.
    #[must_use]
    pub fn with_engines(
        mut self,
        reference: Arc<dyn JwtEngine>,
        target: Arc<dyn JwtEngine>,
    ) -> Self {
        self.reference = reference;
        self.target = target;
        self
    }

    /// Replace the progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Run every iteration, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first engine error or claims mismatch, tagged with where
    /// it happened.
    pub async fn run(&self) -> ConformanceResult<RunReport> {
        let started = Instant::now();
        let total = self.config.iterations;
        LoggingTransformer::log_run_start(
            total,
            self.config.algorithms.len(),
            &self.config.subject,
        );

        let mut checks = 0;
        for iteration in 1..=total {
            self.progress.report(&format!("Iteration {iteration}/{total}"));
            if self.config.untrusted_demo {
                self.untrusted_demo(iteration).await?;
            }
            for &algorithm in &self.config.algorithms {
                checks += self.run_algorithm(iteration, algorithm).await?;
            }
        }

        let report = RunReport {
            iterations: total,
            checks,
            elapsed: started.elapsed(),
        };
        LoggingTransformer::log_run_summary(report.iterations, report.checks, report.elapsed);
        Ok(report)
    }

    /// One pass of the state machine for `algorithm`. Returns the number of
    /// directional checks passed.
    async fn run_algorithm(
        &self,
        iteration: u32,
        algorithm: Algorithm,
    ) -> ConformanceResult<usize> {
        let mut stage = Stage::GenerateKeys;
        let mut checks = 0;
        let now = Utc::now();
        let signing_time = TimeOptions::fixed(now);

        let key = self.generate_key(iteration, algorithm, stage).await?;

        stage = self.advance(iteration, algorithm, stage);
        let token = self
            .sign(&self.reference, &key, algorithm, &self.seed, &signing_time)
            .await?
            .map_err(|e| self.fail(iteration, algorithm, stage, e))?;

        stage = self.advance(iteration, algorithm, stage);
        self.announce(algorithm, Direction::ReferenceToTarget);
        let target_claims = self
            .verify(&self.target, &key, token)
            .await?
            .map_err(|e| self.fail(iteration, algorithm, stage, e))?;

        stage = self.advance(iteration, algorithm, stage);
        let expected = self
            .seed
            .clone()
            .stamped(Some(&self.config.subject), now, self.ttl);
        self.check(iteration, algorithm, stage, compare::exact(&expected, &target_claims))?;
        checks += 1;

        stage = self.advance(iteration, algorithm, stage);
        let token = self
            .sign(&self.target, &key, algorithm, &target_claims, &signing_time)
            .await?
            .map_err(|e| self.fail(iteration, algorithm, stage, e))?;

        stage = self.advance(iteration, algorithm, stage);
        self.announce(algorithm, Direction::TargetToReference);
        let reference_claims = self
            .verify(&self.reference, &key, token)
            .await?
            .map_err(|e| self.fail(iteration, algorithm, stage, e))?;

        stage = self.advance(iteration, algorithm, stage);
        self.check(
            iteration,
            algorithm,
            stage,
            compare::ignoring_expiration(&target_claims, &reference_claims),
        )?;
        checks += 1;

        self.advance(iteration, algorithm, stage);
        Ok(checks)
    }

    /// Sign with the reference engine and decode the result without
    /// verification, logging only its structure.
    async fn untrusted_demo(&self, iteration: u32) -> ConformanceResult<()> {
        let algorithm = Algorithm::EdDsa;
        let stage = Stage::UntrustedDecode;
        let key = self.generate_key(iteration, algorithm, stage).await?;
        let token = self
            .sign(&self.reference, &key, algorithm, &self.seed, &TimeOptions::default())
            .await?
            .map_err(|e| self.fail(iteration, algorithm, stage, e))?;

        let untrusted =
            decode_unverified(&token).map_err(|e| self.fail(iteration, algorithm, stage, e))?;
        LoggingTransformer::log_untrusted_decode(
            algorithm.as_str(),
            untrusted.unverified_payload().keys().map(String::as_str),
        );
        let rendered = serde_json::to_string(&untrusted).map_err(|e| {
            let source = JwtError::serialization(&e.to_string());
            self.fail(iteration, algorithm, stage, source)
        })?;
        self.progress.report(&format!("Untrusted token: {rendered}"));
        Ok(())
    }

    async fn generate_key(
        &self,
        iteration: u32,
        algorithm: Algorithm,
        stage: Stage,
    ) -> ConformanceResult<Arc<KeyMaterial>> {
        let keys = self.keys.clone();
        let started = Instant::now();
        let key = blocking(move || keys.generate(algorithm))
            .await?
            .map_err(|e| self.fail(iteration, algorithm, stage, e))?;
        LoggingTransformer::log_key_generated(
            algorithm.as_str(),
            &key.thumbprint(),
            started.elapsed(),
        );
        Ok(Arc::new(key))
    }

    async fn sign(
        &self,
        engine: &Arc<dyn JwtEngine>,
        key: &Arc<KeyMaterial>,
        algorithm: Algorithm,
        claims: &ClaimsSet,
        time: &TimeOptions,
    ) -> ConformanceResult<JwtResult<Token>> {
        let (engine, key, claims, time) =
            (Arc::clone(engine), Arc::clone(key), claims.clone(), time.clone());
        blocking(move || engine.sign(&claims, &key, algorithm, &time)).await
    }

    async fn verify(
        &self,
        engine: &Arc<dyn JwtEngine>,
        key: &Arc<KeyMaterial>,
        token: Token,
    ) -> ConformanceResult<JwtResult<ClaimsSet>> {
        let (engine, key) = (Arc::clone(engine), Arc::clone(key));
        blocking(move || engine.verify(&token, &key, &TimeOptions::default())).await
    }

    fn advance(&self, iteration: u32, algorithm: Algorithm, stage: Stage) -> Stage {
        let next = stage.next();
        tracing::debug!(iteration, %algorithm, from = %stage, to = %next, "stage transition");
        next
    }

    fn announce(&self, algorithm: Algorithm, direction: Direction) {
        self.progress
            .report(&format!("Verifying {algorithm} ({direction})..."));
    }

    fn check(
        &self,
        iteration: u32,
        algorithm: Algorithm,
        stage: Stage,
        outcome: Result<(), ClaimsDiff>,
    ) -> ConformanceResult<()> {
        let direction = stage.direction().unwrap_or(Direction::ReferenceToTarget);
        match outcome {
            Ok(()) => {
                LoggingTransformer::log_check_passed(
                    iteration,
                    algorithm.as_str(),
                    &direction.to_string(),
                );
                Ok(())
            }
            Err(diff) => {
                LoggingTransformer::log_check_failed(
                    iteration,
                    algorithm.as_str(),
                    &stage.to_string(),
                    "ClaimsMismatch",
                    &diff.to_string(),
                );
                Err(ConformanceError::ClaimsMismatch {
                    iteration,
                    algorithm,
                    direction,
                    diff,
                })
            }
        }
    }

    fn fail(
        &self,
        iteration: u32,
        algorithm: Algorithm,
        stage: Stage,
        source: JwtError,
    ) -> ConformanceError {
        LoggingTransformer::log_check_failed(
            iteration,
            algorithm.as_str(),
            &stage.to_string(),
            source.kind(),
            &source.to_string(),
        );
        ConformanceError::Jwt {
            iteration,
            algorithm,
            direction: stage.direction(),
            stage,
            source,
        }
    }
}

/// Run `f` on the blocking pool.
async fn blocking<T, F>(f: F) -> ConformanceResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ConformanceError::Task(e.to_string()))
}
