//! ECDSA algorithms (ES256 on P-256, ES256K on secp256k1) for the reference engine
//!
//! JWS carries ECDSA signatures as fixed-width `r || s` (64 bytes for both
//! curves), not DER.

use crate::error::JwtError;

/// Sign with ECDSA P-256 (ES256)
pub(crate) fn sign_es256(message: &str, key: &p256::ecdsa::SigningKey) -> Vec<u8> {
    use p256::ecdsa::{signature::Signer, Signature};
    let signature: Signature = key.sign(message.as_bytes());
    signature.to_bytes().to_vec()
}

/// Verify ECDSA P-256 (ES256)
pub(crate) fn verify_es256(
    message: &str,
    signature: &[u8],
    key: &p256::ecdsa::VerifyingKey,
) -> Result<bool, JwtError> {
    use p256::ecdsa::{signature::Verifier, Signature};
    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(key.verify(message.as_bytes(), &signature).is_ok())
}

/// Sign with ECDSA secp256k1 (ES256K). Signatures are low-S normalized.
pub(crate) fn sign_es256k(message: &str, key: &k256::ecdsa::SigningKey) -> Vec<u8> {
    use k256::ecdsa::{signature::Signer, Signature};
    let signature: Signature = key.sign(message.as_bytes());
    signature.to_bytes().to_vec()
}

/// Verify ECDSA secp256k1 (ES256K)
pub(crate) fn verify_es256k(
    message: &str,
    signature: &[u8],
    key: &k256::ecdsa::VerifyingKey,
) -> Result<bool, JwtError> {
    use k256::ecdsa::{signature::Verifier, Signature};
    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(key.verify(message.as_bytes(), &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn test_signatures_are_fixed_width() {
        let p256_key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let sig = sign_es256("a.b", &p256_key);
        assert_eq!(sig.len(), 64);
        assert!(verify_es256("a.b", &sig, p256_key.verifying_key()).unwrap());

        let k256_key = k256::ecdsa::SigningKey::random(&mut OsRng);
        let sig = sign_es256k("a.b", &k256_key);
        assert_eq!(sig.len(), 64);
        assert!(verify_es256k("a.b", &sig, k256_key.verifying_key()).unwrap());
        assert!(!verify_es256k("a.c", &sig, k256_key.verifying_key()).unwrap());
    }

    #[test]
    fn test_der_signatures_are_rejected() {
        use p256::ecdsa::{signature::Signer, Signature};
        let key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let signature: Signature = key.sign(b"a.b");
        let der = signature.to_der();
        assert!(!verify_es256("a.b", der.as_bytes(), key.verifying_key()).unwrap());
    }
}
