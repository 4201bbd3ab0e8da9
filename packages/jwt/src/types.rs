//! JWT header and compact token types

use crate::error::{JwtError, JwtResult};
use serde::{Deserialize, Serialize};

/// JWT header structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Declared algorithm. Absent on malformed tokens, which verifiers reject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Token type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Key ID hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwtHeader {
    /// Header carrying only the algorithm name.
    #[must_use]
    pub fn new(alg: &str) -> Self {
        Self {
            alg: Some(alg.to_string()),
            typ: None,
            kid: None,
        }
    }

    /// Add `"typ": "JWT"`.
    #[must_use]
    pub fn with_jwt_type(mut self) -> Self {
        self.typ = Some("JWT".to_string());
        self
    }
}

/// The three base64url segments of a compact token, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    /// Encoded header
    pub header: &'a str,
    /// Encoded payload
    pub payload: &'a str,
    /// Encoded signature
    pub signature: &'a str,
}

impl TokenParts<'_> {
    /// `header "." payload`, the JWS signing input.
    #[must_use]
    pub fn signing_input(&self) -> String {
        let mut input = String::with_capacity(self.header.len() + 1 + self.payload.len());
        input.push_str(self.header);
        input.push('.');
        input.push_str(self.payload);
        input
    }
}

/// Compact JWT: `header.payload.signature`. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Wrap a compact token string received from elsewhere. No validation
    /// happens here; verifiers and the untrusted decoder reject malformed input.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Assemble a token from its encoded signing input and signature.
    pub(crate) fn assemble(signing_input: &str, signature_b64: &str) -> Self {
        let mut token = String::with_capacity(signing_input.len() + 1 + signature_b64.len());
        token.push_str(signing_input);
        token.push('.');
        token.push_str(signature_b64);
        Self(token)
    }

    /// The compact serialization.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into exactly three segments.
    ///
    /// # Errors
    /// Returns `MalformedToken` if the token does not have three segments.
    pub fn parts(&self) -> JwtResult<TokenParts<'_>> {
        let mut segments = self.0.split('.');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(header), Some(payload), Some(signature), None) => Ok(TokenParts {
                header,
                payload,
                signature,
            }),
            _ => Err(JwtError::malformed("expected three dot-separated segments")),
        }
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
