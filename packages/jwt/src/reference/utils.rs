//! Reference engine utilities - base64url coding and constant-time comparison

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use subtle::ConstantTimeEq;

/// Base64 URL-safe encoding without padding (RFC 7515)
#[inline]
pub(crate) fn base64_url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64 URL-safe decoding without padding (RFC 7515)
#[inline]
pub(crate) fn base64_url_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}

/// Constant-time comparison; lengths are not secret.
#[inline]
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
