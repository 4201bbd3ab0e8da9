//! JWT error types shared by both engines, the key provider and the decoder

use thiserror::Error;

/// JWT operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// JWT error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Algorithm name is absent, unknown, or not part of the JWS matrix
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Key family does not match the algorithm in use
    #[error("Key does not match algorithm {algorithm}: got {key} key")]
    KeyAlgorithmMismatch {
        /// Algorithm requested by the caller or declared by the token
        algorithm: String,
        /// Description of the key that was supplied
        key: String,
    },
    /// Wrong segment count, invalid base64url, or invalid JSON
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    /// Signature does not verify under the supplied key
    #[error("Signature mismatch")]
    SignatureMismatch,
    /// `exp` claim has elapsed
    #[error("Token expired at {expired_at} (now {now})")]
    TokenExpired {
        /// Value of the `exp` claim
        expired_at: i64,
        /// Verification time
        now: i64,
    },
    /// Key material is malformed or too weak for the algorithm
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Header or claims could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JwtError {
    /// Create an unsupported algorithm error
    #[inline]
    #[must_use]
    pub fn unsupported_algorithm(alg: &str) -> Self {
        JwtError::UnsupportedAlgorithm(alg.to_string())
    }

    /// Create a key/algorithm mismatch error
    #[inline]
    #[must_use]
    pub fn key_mismatch(algorithm: impl ToString, key: impl ToString) -> Self {
        JwtError::KeyAlgorithmMismatch {
            algorithm: algorithm.to_string(),
            key: key.to_string(),
        }
    }

    /// Create a malformed token error
    #[inline]
    #[must_use]
    pub fn malformed(msg: &str) -> Self {
        JwtError::MalformedToken(msg.to_string())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        JwtError::InvalidKey(msg.to_string())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: &str) -> Self {
        JwtError::Serialization(msg.to_string())
    }

    /// Create an internal error
    #[inline]
    #[must_use]
    pub fn internal(msg: &str) -> Self {
        JwtError::Internal(msg.to_string())
    }

    /// Short stable name of the error kind, used in reports
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            JwtError::UnsupportedAlgorithm(_) => "UnsupportedAlgorithm",
            JwtError::KeyAlgorithmMismatch { .. } => "KeyAlgorithmMismatch",
            JwtError::MalformedToken(_) => "MalformedToken",
            JwtError::SignatureMismatch => "SignatureMismatch",
            JwtError::TokenExpired { .. } => "TokenExpired",
            JwtError::InvalidKey(_) => "InvalidKey",
            JwtError::Serialization(_) => "Serialization",
            JwtError::Internal(_) => "Internal",
        }
    }
}
