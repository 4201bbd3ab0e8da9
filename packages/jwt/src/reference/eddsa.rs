//! EdDSA over Ed25519 for the reference engine

use crate::error::JwtError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Sign with Ed25519
pub(crate) fn sign_eddsa(message: &str, key: &SigningKey) -> Vec<u8> {
    key.sign(message.as_bytes()).to_bytes().to_vec()
}

/// Verify an Ed25519 signature
pub(crate) fn verify_eddsa(
    message: &str,
    signature: &[u8],
    key: &VerifyingKey,
) -> Result<bool, JwtError> {
    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(key.verify(message.as_bytes(), &signature).is_ok())
}
