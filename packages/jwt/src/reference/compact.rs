//! Compact serialization: stamping, signing and verification for the reference engine

use super::ecdsa::{sign_es256, sign_es256k, verify_es256, verify_es256k};
use super::eddsa::{sign_eddsa, verify_eddsa};
use super::hmac::{sign_hmac, verify_hmac};
use super::rsa::{sign_rsa, verify_rsa};
use super::utils::{base64_url_decode, base64_url_encode};
use crate::{
    algorithms::Algorithm,
    claims::{registered, ClaimsSet},
    error::{JwtError, JwtResult},
    keys::{KeyMaterial, KeyPair},
    types::{JwtHeader, Token},
    validation::TimeOptions,
};
use serde_json::{Map, Value};

/// Stamp `claims` and produce a compact token.
pub(crate) fn sign_jwt(
    claims: &ClaimsSet,
    key: &KeyMaterial,
    algorithm: Algorithm,
    subject: Option<&str>,
    ttl: chrono::Duration,
    time: &TimeOptions,
) -> JwtResult<Token> {
    key.ensure_algorithm(algorithm)?;

    let now = time.now();
    let mut payload: Map<String, Value> = claims.as_map().clone();
    if let Some(sub) = subject {
        payload
            .entry(registered::SUBJECT)
            .or_insert_with(|| Value::from(sub));
    }
    payload
        .entry(registered::ISSUED_AT)
        .or_insert_with(|| Value::from(now.timestamp()));
    payload.insert(
        registered::EXPIRATION.to_string(),
        Value::from((now + ttl).timestamp()),
    );

    let header = JwtHeader::new(algorithm.as_str());
    let header_json =
        serde_json::to_string(&header).map_err(|e| JwtError::serialization(&e.to_string()))?;
    let payload_json =
        serde_json::to_string(&payload).map_err(|e| JwtError::serialization(&e.to_string()))?;

    let message = format!(
        "{}.{}",
        base64_url_encode(header_json.as_bytes()),
        base64_url_encode(payload_json.as_bytes())
    );

    let signature = match (key.pair(), algorithm) {
        (KeyPair::Symmetric(secret), alg) => match alg.sha() {
            Some(sha) => sign_hmac(sha, &message, secret)?,
            _ => return Err(JwtError::key_mismatch(alg, key.family())),
        },
        (KeyPair::Rsa(private_key), alg) => sign_rsa(alg, &message, private_key)?,
        (KeyPair::Ed25519(signing_key), Algorithm::EdDsa) => sign_eddsa(&message, signing_key),
        (KeyPair::Secp256k1(signing_key), Algorithm::Es256K) => sign_es256k(&message, signing_key),
        (KeyPair::P256(signing_key), Algorithm::Es256) => sign_es256(&message, signing_key),
        (_, alg) => return Err(JwtError::key_mismatch(alg, key.family())),
    };

    Ok(Token::assemble(&message, &base64_url_encode(&signature)))
}

/// Verify a compact token and return its payload.
pub(crate) fn verify_jwt(
    token: &Token,
    key: &KeyMaterial,
    time: &TimeOptions,
) -> JwtResult<ClaimsSet> {
    let parts = token.parts()?;

    let header_bytes = base64_url_decode(parts.header)
        .map_err(|_| JwtError::malformed("invalid header encoding"))?;
    let header: JwtHeader = serde_json::from_slice(&header_bytes)
        .map_err(|_| JwtError::malformed("invalid header JSON"))?;
    let algorithm: Algorithm = header
        .alg
        .as_deref()
        .ok_or_else(|| JwtError::unsupported_algorithm("<missing>"))?
        .parse()?;

    key.ensure_algorithm(algorithm)?;

    let signature = base64_url_decode(parts.signature)
        .map_err(|_| JwtError::malformed("invalid signature encoding"))?;
    let message = parts.signing_input();

    let valid = match key.pair() {
        KeyPair::Symmetric(secret) => match algorithm.sha() {
            Some(sha) => verify_hmac(sha, &message, &signature, secret)?,
            None => return Err(JwtError::key_mismatch(algorithm, key.family())),
        },
        KeyPair::Rsa(private_key) => {
            verify_rsa(algorithm, &message, &signature, &private_key.to_public_key())?
        }
        KeyPair::Ed25519(signing_key) => {
            verify_eddsa(&message, &signature, &signing_key.verifying_key())?
        }
        KeyPair::Secp256k1(signing_key) => {
            verify_es256k(&message, &signature, signing_key.verifying_key())?
        }
        KeyPair::P256(signing_key) => verify_es256(&message, &signature, signing_key.verifying_key())?,
    };
    if !valid {
        return Err(JwtError::SignatureMismatch);
    }

    let payload_bytes = base64_url_decode(parts.payload)
        .map_err(|_| JwtError::malformed("invalid payload encoding"))?;
    let payload: Value = serde_json::from_slice(&payload_bytes)
        .map_err(|_| JwtError::malformed("invalid payload JSON"))?;
    let claims = ClaimsSet::from_value(payload)?;

    time.check_claims_expiration(claims.get(registered::EXPIRATION))?;
    Ok(claims)
}
