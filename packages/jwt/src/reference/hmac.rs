//! HMAC-SHA algorithms (HS256, HS384, HS512) for the reference engine

use super::utils::constant_time_eq;
use crate::{algorithms::ShaSize, error::JwtError};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Reject secrets shorter than the hash output.
pub(crate) fn validate_hmac_key(secret: &[u8], sha: ShaSize) -> Result<(), JwtError> {
    let min_length = sha.output_len();
    if secret.len() < min_length {
        return Err(JwtError::InvalidKey(format!(
            "HMAC key must be at least {min_length} bytes, got {}",
            secret.len()
        )));
    }
    Ok(())
}

/// Sign with HMAC-SHA2
pub(crate) fn sign_hmac(sha: ShaSize, message: &str, secret: &[u8]) -> Result<Vec<u8>, JwtError> {
    validate_hmac_key(secret, sha)?;
    let invalid = |_| JwtError::invalid_key("Invalid HMAC key");
    let tag = match sha {
        ShaSize::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret).map_err(invalid)?;
            mac.update(message.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
        ShaSize::Sha384 => {
            let mut mac = HmacSha384::new_from_slice(secret).map_err(invalid)?;
            mac.update(message.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
        ShaSize::Sha512 => {
            let mut mac = HmacSha512::new_from_slice(secret).map_err(invalid)?;
            mac.update(message.as_bytes());
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(tag)
}

/// Verify an HMAC-SHA2 tag by recomputing it and comparing in constant time
pub(crate) fn verify_hmac(
    sha: ShaSize,
    message: &str,
    signature: &[u8],
    secret: &[u8],
) -> Result<bool, JwtError> {
    let expected = sign_hmac(sha, message, secret)?;
    Ok(constant_time_eq(signature, &expected))
}
