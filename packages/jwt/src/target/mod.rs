//! Target engine: typed algorithms over keys re-imported from JWK.
//!
//! Shares no signing code with the reference engine. Keys are consumed only
//! through their JWK export, and headers carry `"typ": "JWT"`.

mod alg;
mod claims;
mod import;

use self::{
    alg::{Ed25519, Es256, Es256K, Hs256, Hs384, Hs512, JwsAlgorithm, Rsa, RsaPadding},
    claims::Claims,
    import::FromJwk,
};
use crate::{
    algorithms::{Algorithm, ShaSize},
    claims::{registered, ClaimsSet},
    error::{JwtError, JwtResult},
    jwk::JsonWebKey,
    keys::KeyMaterial,
    traits::{JwtEngine, SignOptions, TokenSigner, TokenVerifier},
    types::{JwtHeader, Token},
    validation::TimeOptions,
};

fn sign_with<A: JwsAlgorithm>(alg: A, jwk: &JsonWebKey, message: &[u8]) -> JwtResult<Vec<u8>> {
    let key = A::SigningKey::from_jwk(jwk)?;
    alg.sign(&key, message)
}

fn verify_with<A: JwsAlgorithm>(
    alg: A,
    jwk: &JsonWebKey,
    message: &[u8],
    signature: &[u8],
) -> JwtResult<bool> {
    let key = A::VerifyingKey::from_jwk(jwk)?;
    Ok(alg.verify_signature(&key, message, signature))
}

const fn rsa(hash: ShaSize, padding: RsaPadding) -> Rsa {
    Rsa::new(hash, padding)
}

fn sign_message(algorithm: Algorithm, jwk: &JsonWebKey, message: &[u8]) -> JwtResult<Vec<u8>> {
    use RsaPadding::{Pkcs1v15, Pss};
    match algorithm {
        Algorithm::Hs256 => sign_with(Hs256, jwk, message),
        Algorithm::Hs384 => sign_with(Hs384, jwk, message),
        Algorithm::Hs512 => sign_with(Hs512, jwk, message),
        Algorithm::Rs256 => sign_with(rsa(ShaSize::Sha256, Pkcs1v15), jwk, message),
        Algorithm::Rs384 => sign_with(rsa(ShaSize::Sha384, Pkcs1v15), jwk, message),
        Algorithm::Rs512 => sign_with(rsa(ShaSize::Sha512, Pkcs1v15), jwk, message),
        Algorithm::Ps256 => sign_with(rsa(ShaSize::Sha256, Pss), jwk, message),
        Algorithm::Ps384 => sign_with(rsa(ShaSize::Sha384, Pss), jwk, message),
        Algorithm::Ps512 => sign_with(rsa(ShaSize::Sha512, Pss), jwk, message),
        Algorithm::EdDsa => sign_with(Ed25519, jwk, message),
        Algorithm::Es256 => sign_with(Es256, jwk, message),
        Algorithm::Es256K => sign_with(Es256K, jwk, message),
    }
}

fn verify_message(
    algorithm: Algorithm,
    jwk: &JsonWebKey,
    message: &[u8],
    signature: &[u8],
) -> JwtResult<bool> {
    use RsaPadding::{Pkcs1v15, Pss};
    match algorithm {
        Algorithm::Hs256 => verify_with(Hs256, jwk, message, signature),
        Algorithm::Hs384 => verify_with(Hs384, jwk, message, signature),
        Algorithm::Hs512 => verify_with(Hs512, jwk, message, signature),
        Algorithm::Rs256 => verify_with(rsa(ShaSize::Sha256, Pkcs1v15), jwk, message, signature),
        Algorithm::Rs384 => verify_with(rsa(ShaSize::Sha384, Pkcs1v15), jwk, message, signature),
        Algorithm::Rs512 => verify_with(rsa(ShaSize::Sha512, Pkcs1v15), jwk, message, signature),
        Algorithm::Ps256 => verify_with(rsa(ShaSize::Sha256, Pss), jwk, message, signature),
        Algorithm::Ps384 => verify_with(rsa(ShaSize::Sha384, Pss), jwk, message, signature),
        Algorithm::Ps512 => verify_with(rsa(ShaSize::Sha512, Pss), jwk, message, signature),
        Algorithm::EdDsa => verify_with(Ed25519, jwk, message, signature),
        Algorithm::Es256 => verify_with(Es256, jwk, message, signature),
        Algorithm::Es256K => verify_with(Es256K, jwk, message, signature),
    }
}

fn decode_segment(segment: &str, what: &str) -> JwtResult<Vec<u8>> {
    base64_url::decode(segment)
        .map_err(|_| JwtError::MalformedToken(format!("invalid {what} encoding")))
}

/// Engine working from JWK exports and typed claims.
#[derive(Debug, Clone, Default)]
pub struct TargetEngine {
    options: SignOptions,
}

impl TargetEngine {
    /// Engine with the given stamping options.
    #[must_use]
    pub fn new(options: SignOptions) -> Self {
        Self { options }
    }
}

impl TokenSigner for TargetEngine {
    fn sign(
        &self,
        claims: &ClaimsSet,
        key: &KeyMaterial,
        algorithm: Algorithm,
        time: &TimeOptions,
    ) -> JwtResult<Token> {
        let jwk = key.to_jwk();
        jwk.ensure_algorithm(algorithm)?;

        let mut claims = Claims::from_claims_set(claims);
        claims.stamp(self.options.subject.as_deref(), time.now(), self.options.ttl);

        let header = JwtHeader::new(algorithm.as_str()).with_jwt_type();
        let header =
            serde_json::to_vec(&header).map_err(|e| JwtError::serialization(&e.to_string()))?;
        let payload =
            serde_json::to_vec(&claims).map_err(|e| JwtError::serialization(&e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            base64_url::encode(&header),
            base64_url::encode(&payload)
        );

        let signature = sign_message(algorithm, &jwk, signing_input.as_bytes())?;
        tracing::trace!(alg = %algorithm, engine = "target", "signed token");
        Ok(Token::assemble(&signing_input, &base64_url::encode(&signature)))
    }
}

impl TokenVerifier for TargetEngine {
    fn verify(&self, token: &Token, key: &KeyMaterial, time: &TimeOptions) -> JwtResult<ClaimsSet> {
        let parts = token.parts()?;

        let header: JwtHeader = serde_json::from_slice(&decode_segment(parts.header, "header")?)
            .map_err(|_| JwtError::malformed("invalid header JSON"))?;
        let algorithm: Algorithm = match header.alg.as_deref() {
            Some(alg) => alg.parse()?,
            None => return Err(JwtError::unsupported_algorithm("<missing>")),
        };

        let jwk = key.to_public_jwk();
        jwk.ensure_algorithm(algorithm)?;

        let signature = decode_segment(parts.signature, "signature")?;
        let signing_input = parts.signing_input();
        if !verify_message(algorithm, &jwk, signing_input.as_bytes(), &signature)? {
            return Err(JwtError::SignatureMismatch);
        }

        let payload = decode_segment(parts.payload, "payload")?;
        let payload: serde_json::Value = serde_json::from_slice(&payload)
            .map_err(|_| JwtError::malformed("invalid payload JSON"))?;
        let claims = ClaimsSet::from_value(payload)?;

        time.check_claims_expiration(claims.get(registered::EXPIRATION))?;
        Ok(claims)
    }
}

impl JwtEngine for TargetEngine {
    fn name(&self) -> &'static str {
        "target"
    }
}
