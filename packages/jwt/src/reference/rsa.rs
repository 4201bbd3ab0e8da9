//! RSA algorithms (RS256/384/512 PKCS#1 v1.5, PS256/384/512 PSS) for the reference engine

use crate::{
    algorithms::{Algorithm, KeyFamily},
    error::JwtError,
};
use rand_core::OsRng;
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};
use rsa::{pkcs1v15, pss, RsaPrivateKey, RsaPublicKey};

/// Sign with an RSA algorithm. PSS uses a random salt as long as the hash.
pub(crate) fn sign_rsa(
    algorithm: Algorithm,
    message: &str,
    private_key: &RsaPrivateKey,
) -> Result<Vec<u8>, JwtError> {
    let key = private_key.clone();
    let message = message.as_bytes();
    let signature = match algorithm {
        Algorithm::Rs256 => pkcs1v15::SigningKey::<Sha256>::new(key)
            .try_sign(message)
            .map(|s| s.to_vec()),
        Algorithm::Rs384 => pkcs1v15::SigningKey::<Sha384>::new(key)
            .try_sign(message)
            .map(|s| s.to_vec()),
        Algorithm::Rs512 => pkcs1v15::SigningKey::<Sha512>::new(key)
            .try_sign(message)
            .map(|s| s.to_vec()),
        Algorithm::Ps256 => pss::BlindedSigningKey::<Sha256>::new(key)
            .try_sign_with_rng(&mut OsRng, message)
            .map(|s| s.to_vec()),
        Algorithm::Ps384 => pss::BlindedSigningKey::<Sha384>::new(key)
            .try_sign_with_rng(&mut OsRng, message)
            .map(|s| s.to_vec()),
        Algorithm::Ps512 => pss::BlindedSigningKey::<Sha512>::new(key)
            .try_sign_with_rng(&mut OsRng, message)
            .map(|s| s.to_vec()),
        other => return Err(JwtError::key_mismatch(other, KeyFamily::Rsa)),
    };
    signature.map_err(|e| JwtError::internal(&format!("RSA signing failed: {e}")))
}

/// Verify an RSA signature. Unparseable signatures count as mismatches.
pub(crate) fn verify_rsa(
    algorithm: Algorithm,
    message: &str,
    signature: &[u8],
    public_key: &RsaPublicKey,
) -> Result<bool, JwtError> {
    let key = public_key.clone();
    let message = message.as_bytes();
    let valid = match algorithm {
        Algorithm::Rs256 | Algorithm::Rs384 | Algorithm::Rs512 => {
            let Ok(signature) = pkcs1v15::Signature::try_from(signature) else {
                return Ok(false);
            };
            match algorithm {
                Algorithm::Rs256 => pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(message, &signature),
                Algorithm::Rs384 => pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(message, &signature),
                _ => pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(message, &signature),
            }
            .is_ok()
        }
        Algorithm::Ps256 | Algorithm::Ps384 | Algorithm::Ps512 => {
            let Ok(signature) = pss::Signature::try_from(signature) else {
                return Ok(false);
            };
            match algorithm {
                Algorithm::Ps256 => pss::VerifyingKey::<Sha256>::new(key).verify(message, &signature),
                Algorithm::Ps384 => pss::VerifyingKey::<Sha384>::new(key).verify(message, &signature),
                _ => pss::VerifyingKey::<Sha512>::new(key).verify(message, &signature),
            }
            .is_ok()
        }
        other => return Err(JwtError::key_mismatch(other, KeyFamily::Rsa)),
    };
    Ok(valid)
}
