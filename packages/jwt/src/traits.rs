//! Signer/verifier contract shared by the reference and target engines.

use crate::{
    algorithms::Algorithm, claims::ClaimsSet, error::JwtResult, keys::KeyMaterial,
    types::Token, validation::TimeOptions,
};
use chrono::Duration;

/// Claim stamping applied by a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    /// Lifetime added to the signing time to produce `exp`.
    pub ttl: Duration,
    /// `sub` added when the input claims have none.
    pub subject: Option<String>,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(1),
            subject: None,
        }
    }
}

impl SignOptions {
    /// Set the token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the default subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Claims + key → compact token.
///
/// Implementations add `sub` (when configured and absent) and `iat` (when
/// absent), always set `exp = now + ttl`, and fail with
/// `KeyAlgorithmMismatch` when the key family does not fit `algorithm`.
pub trait TokenSigner: Send + Sync {
    /// Sign `claims` with `key` under `algorithm`.
    fn sign(
        &self,
        claims: &ClaimsSet,
        key: &KeyMaterial,
        algorithm: Algorithm,
        time: &TimeOptions,
    ) -> JwtResult<Token>;
}

/// Compact token + key → verified claims.
///
/// Implementations verify the signature under the header-declared algorithm,
/// reject an elapsed `exp`, and return the embedded claims unchanged.
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` with `key`.
    fn verify(&self, token: &Token, key: &KeyMaterial, time: &TimeOptions) -> JwtResult<ClaimsSet>;
}

/// A complete signing/verification engine.
pub trait JwtEngine: TokenSigner + TokenVerifier {
    /// Short engine name used in progress lines and reports.
    fn name(&self) -> &'static str;
}

impl<T: TokenSigner + ?Sized> TokenSigner for std::sync::Arc<T> {
    fn sign(
        &self,
        claims: &ClaimsSet,
        key: &KeyMaterial,
        algorithm: Algorithm,
        time: &TimeOptions,
    ) -> JwtResult<Token> {
        (**self).sign(claims, key, algorithm, time)
    }
}

impl<T: TokenVerifier + ?Sized> TokenVerifier for std::sync::Arc<T> {
    fn verify(&self, token: &Token, key: &KeyMaterial, time: &TimeOptions) -> JwtResult<ClaimsSet> {
        (**self).verify(token, key, time)
    }
}

impl<T: JwtEngine + ?Sized> JwtEngine for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }
}
