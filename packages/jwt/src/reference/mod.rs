//! Reference engine: native keys, dynamic JSON payloads, one primitive
//! module per key family.

mod compact;
mod ecdsa;
mod eddsa;
mod hmac;
mod rsa;
mod utils;

use crate::{
    algorithms::Algorithm,
    claims::ClaimsSet,
    error::JwtResult,
    keys::KeyMaterial,
    traits::{JwtEngine, SignOptions, TokenSigner, TokenVerifier},
    types::Token,
    validation::TimeOptions,
};

/// Engine signing straight from the generated key objects.
///
/// Headers carry only `alg`. HMAC secrets shorter than the hash output are
/// rejected as `InvalidKey`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceEngine {
    options: SignOptions,
}

impl ReferenceEngine {
    /// Engine with the given stamping options.
    #[must_use]
    pub fn new(options: SignOptions) -> Self {
        Self { options }
    }
}

impl TokenSigner for ReferenceEngine {
    fn sign(
        &self,
        claims: &ClaimsSet,
        key: &KeyMaterial,
        algorithm: Algorithm,
        time: &TimeOptions,
    ) -> JwtResult<Token> {
        let token = compact::sign_jwt(
            claims,
            key,
            algorithm,
            self.options.subject.as_deref(),
            self.options.ttl,
            time,
        )?;
        tracing::trace!(alg = %algorithm, engine = "reference", "signed token");
        Ok(token)
    }
}

impl TokenVerifier for ReferenceEngine {
    fn verify(&self, token: &Token, key: &KeyMaterial, time: &TimeOptions) -> JwtResult<ClaimsSet> {
        compact::verify_jwt(token, key, time)
    }
}

impl JwtEngine for ReferenceEngine {
    fn name(&self) -> &'static str {
        "reference"
    }
}
