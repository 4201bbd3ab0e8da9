//! Structural inspection of tokens without signature verification.
//!
//! Nothing here establishes trust. [`UntrustedToken`] deliberately exposes its
//! payload as a raw JSON object rather than a [`ClaimsSet`](crate::ClaimsSet),
//! so decoded output can never be passed where verified claims are expected.

use crate::{
    algorithms::Algorithm,
    error::{JwtError, JwtResult},
    types::{JwtHeader, Token},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Serialize;
use serde_json::{Map, Value};

/// Header and payload of a token whose signature has NOT been checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UntrustedToken {
    header: JwtHeader,
    payload: Map<String, Value>,
    signature_len: usize,
}

impl UntrustedToken {
    /// Decoded header, as claimed by the token.
    #[must_use]
    pub fn header(&self) -> &JwtHeader {
        &self.header
    }

    /// Declared algorithm, if it names one from the matrix.
    #[must_use]
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.header.alg.as_deref().and_then(|alg| alg.parse().ok())
    }

    /// Raw, unverified payload object.
    #[must_use]
    pub fn unverified_payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Length of the decoded signature segment in bytes.
    #[must_use]
    pub fn signature_len(&self) -> usize {
        self.signature_len
    }
}

/// Decode header and payload without checking the signature.
///
/// The signature segment is only base64url-decoded to report its length.
///
/// # Errors
/// Returns `MalformedToken` on a wrong segment count, invalid base64url, or
/// a header/payload that is not a JSON object.
pub fn decode_unverified(token: &Token) -> JwtResult<UntrustedToken> {
    let parts = token.parts()?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(parts.header)
        .map_err(|_| JwtError::malformed("invalid header encoding"))?;
    let header: JwtHeader = serde_json::from_slice(&header_bytes)
        .map_err(|_| JwtError::malformed("invalid header JSON"))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts.payload)
        .map_err(|_| JwtError::malformed("invalid payload encoding"))?;
    let payload: Map<String, Value> = serde_json::from_slice(&payload_bytes)
        .map_err(|_| JwtError::malformed("payload is not a JSON object"))?;

    let signature_len = URL_SAFE_NO_PAD
        .decode(parts.signature)
        .map_err(|_| JwtError::malformed("invalid signature encoding"))?
        .len();

    Ok(UntrustedToken {
        header,
        payload,
        signature_len,
    })
}
