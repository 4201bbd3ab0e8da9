//! End-to-end runs of the conformance state machine

use crossjwt::{
    ConformanceError, Direction, HarnessConfig, Orchestrator, RecordingProgress, Stage,
};
use crossjwt_jwt::{
    Algorithm, ClaimsSet, JwtEngine, JwtError, JwtResult, KeyMaterial, TargetEngine,
    TimeOptions, Token, TokenSigner, TokenVerifier,
};
use std::sync::Arc;

fn config(algorithms: &[Algorithm]) -> HarnessConfig {
    HarnessConfig {
        iterations: 1,
        algorithms: algorithms.to_vec(),
        ..HarnessConfig::default()
    }
}

fn orchestrator(config: HarnessConfig) -> (Orchestrator, Arc<RecordingProgress>) {
    let progress = Arc::new(RecordingProgress::default());
    let orchestrator = Orchestrator::new(config)
        .unwrap()
        .with_progress(progress.clone());
    (orchestrator, progress)
}

/// How a [`Faulty`] engine misbehaves.
#[derive(Clone, Copy)]
enum Fault {
    /// Verification adds a claim
    ExtraClaimOnVerify,
    /// Signing drops the `admin` claim
    DropClaimOnSign,
    /// Verification always fails
    RejectEverything,
}

/// Target engine with one injected fault.
struct Faulty {
    inner: TargetEngine,
    fault: Fault,
}

impl Faulty {
    fn new(config: &HarnessConfig, fault: Fault) -> Arc<dyn JwtEngine> {
        Arc::new(Self {
            inner: TargetEngine::new(config.sign_options().unwrap()),
            fault,
        })
    }
}

impl TokenSigner for Faulty {
    fn sign(
        &self,
        claims: &ClaimsSet,
        key: &KeyMaterial,
        algorithm: Algorithm,
        time: &TimeOptions,
    ) -> JwtResult<Token> {
        match self.fault {
            Fault::DropClaimOnSign => self.inner.sign(&claims.without("admin"), key, algorithm, time),
            _ => self.inner.sign(claims, key, algorithm, time),
        }
    }
}

impl TokenVerifier for Faulty {
    fn verify(&self, token: &Token, key: &KeyMaterial, time: &TimeOptions) -> JwtResult<ClaimsSet> {
        match self.fault {
            Fault::ExtraClaimOnVerify => Ok(self.inner.verify(token, key, time)?.with("role", "root")),
            Fault::RejectEverything => Err(JwtError::SignatureMismatch),
            Fault::DropClaimOnSign => self.inner.verify(token, key, time),
        }
    }
}

impl JwtEngine for Faulty {
    fn name(&self) -> &'static str {
        "faulty"
    }
}

fn with_faulty_target(config: HarnessConfig, fault: Fault) -> (Orchestrator, Arc<RecordingProgress>) {
    let reference: Arc<dyn JwtEngine> =
        Arc::new(crossjwt_jwt::ReferenceEngine::new(config.sign_options().unwrap()));
    let target = Faulty::new(&config, fault);
    let (orchestrator, progress) = orchestrator(config);
    (orchestrator.with_engines(reference, target), progress)
}

#[tokio::test]
async fn test_full_matrix_passes() {
    let (orchestrator, progress) = orchestrator(config(&Algorithm::ALL));
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.iterations, 1);
    assert_eq!(report.checks, 2 * Algorithm::ALL.len());

    let lines = progress.lines();
    assert_eq!(lines[0], "Iteration 1/1");
    assert!(lines[1].starts_with("Untrusted token: "));
    for algorithm in Algorithm::ALL {
        for direction in ["reference -> target", "target -> reference"] {
            let expected = format!("Verifying {algorithm} ({direction})...");
            assert!(lines.contains(&expected), "missing {expected:?}");
        }
    }
}

#[tokio::test]
async fn test_progress_lines_follow_the_state_machine() {
    let mut config = config(&[Algorithm::Hs256, Algorithm::EdDsa]);
    config.iterations = 2;
    config.untrusted_demo = false;
    let (orchestrator, progress) = orchestrator(config);

    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.checks, 8);
    assert_eq!(
        progress.lines(),
        vec![
            "Iteration 1/2",
            "Verifying HS256 (reference -> target)...",
            "Verifying HS256 (target -> reference)...",
            "Verifying EdDSA (reference -> target)...",
            "Verifying EdDSA (target -> reference)...",
            "Iteration 2/2",
            "Verifying HS256 (reference -> target)...",
            "Verifying HS256 (target -> reference)...",
            "Verifying EdDSA (reference -> target)...",
            "Verifying EdDSA (target -> reference)...",
        ]
    );
}

#[tokio::test]
async fn test_extra_claim_fails_compare_a() {
    let (orchestrator, progress) =
        with_faulty_target(config(&[Algorithm::Es256, Algorithm::Hs256]), Fault::ExtraClaimOnVerify);

    match orchestrator.run().await {
        Err(ConformanceError::ClaimsMismatch {
            iteration,
            algorithm,
            direction,
            diff,
        }) => {
            assert_eq!(iteration, 1);
            assert_eq!(algorithm, Algorithm::Es256);
            assert_eq!(direction, Direction::ReferenceToTarget);
            assert_eq!(diff.unexpected.len(), 1);
            assert_eq!(diff.unexpected[0].0, "role");
        }
        other => panic!("expected a claims mismatch, got {other:?}"),
    }

    // Fail-fast: HS256 never started.
    assert!(!progress.lines().iter().any(|line| line.contains("HS256")));
}

#[tokio::test]
async fn test_dropped_claim_fails_compare_b() {
    let (orchestrator, _) = with_faulty_target(config(&[Algorithm::Es256K]), Fault::DropClaimOnSign);

    match orchestrator.run().await {
        Err(ConformanceError::ClaimsMismatch { direction, diff, .. }) => {
            assert_eq!(direction, Direction::TargetToReference);
            assert_eq!(diff.missing.len(), 1);
            assert_eq!(diff.missing[0].0, "admin");
        }
        other => panic!("expected a claims mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_engine_error_is_tagged_with_stage() {
    let (orchestrator, _) = with_faulty_target(config(&[Algorithm::Hs384]), Fault::RejectEverything);

    let err = orchestrator.run().await.unwrap_err();
    match &err {
        ConformanceError::Jwt {
            iteration,
            algorithm,
            direction,
            stage,
            source,
        } => {
            assert_eq!(*iteration, 1);
            assert_eq!(*algorithm, Algorithm::Hs384);
            assert_eq!(*direction, Some(Direction::ReferenceToTarget));
            assert_eq!(*stage, Stage::VerifyTarget);
            assert_eq!(*source, JwtError::SignatureMismatch);
        }
        other => panic!("expected an engine error, got {other:?}"),
    }
    assert_eq!(err.kind(), "SignatureMismatch");
}

#[tokio::test]
async fn test_invalid_config_is_rejected_up_front() {
    let err = Orchestrator::new(HarnessConfig {
        algorithms: Vec::new(),
        ..HarnessConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, ConformanceError::Config(_)));
}

#[test]
fn test_stage_cycle_order() {
    let mut stage = Stage::GenerateKeys;
    let mut seen = vec![stage];
    while stage != Stage::Done {
        stage = stage.next();
        seen.push(stage);
    }
    assert_eq!(
        seen,
        vec![
            Stage::GenerateKeys,
            Stage::SignReference,
            Stage::VerifyTarget,
            Stage::CompareA,
            Stage::SignTarget,
            Stage::VerifyReference,
            Stage::CompareB,
            Stage::Done,
        ]
    );
}
