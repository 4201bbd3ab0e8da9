//! JWS algorithm identifiers and the key families they require

use crate::error::JwtError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Key family an algorithm signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// RSA modulus/exponent pair
    Rsa,
    /// Shared HMAC secret
    Symmetric,
    /// Edwards curve 25519
    Ed25519,
    /// Koblitz curve used by ES256K
    Secp256k1,
    /// NIST P-256
    P256,
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyFamily::Rsa => "RSA",
            KeyFamily::Symmetric => "oct",
            KeyFamily::Ed25519 => "OKP/Ed25519",
            KeyFamily::Secp256k1 => "EC/secp256k1",
            KeyFamily::P256 => "EC/P-256",
        })
    }
}

/// SHA-2 variant used by RSA and HMAC algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaSize {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl ShaSize {
    /// Digest output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            ShaSize::Sha256 => 32,
            ShaSize::Sha384 => 48,
            ShaSize::Sha512 => 64,
        }
    }
}

/// A JWS algorithm from the conformance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    Rs512,
    /// RSASSA-PSS with SHA-256
    Ps256,
    /// RSASSA-PSS with SHA-384
    Ps384,
    /// RSASSA-PSS with SHA-512
    Ps512,
    /// HMAC with SHA-256
    Hs256,
    /// HMAC with SHA-384
    Hs384,
    /// HMAC with SHA-512
    Hs512,
    /// Ed25519 signatures
    EdDsa,
    /// ECDSA on secp256k1 with SHA-256
    Es256K,
    /// ECDSA on P-256 with SHA-256
    Es256,
}

impl Algorithm {
    /// The full matrix in canonical order.
    pub const ALL: [Algorithm; 12] = [
        Algorithm::Rs256,
        Algorithm::Rs384,
        Algorithm::Rs512,
        Algorithm::Ps256,
        Algorithm::Ps384,
        Algorithm::Ps512,
        Algorithm::Hs256,
        Algorithm::Hs384,
        Algorithm::Hs512,
        Algorithm::EdDsa,
        Algorithm::Es256K,
        Algorithm::Es256,
    ];

    /// Registered JWS name, as written to the `alg` header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Algorithm::Rs256 => "RS256",
            Algorithm::Rs384 => "RS384",
            Algorithm::Rs512 => "RS512",
            Algorithm::Ps256 => "PS256",
            Algorithm::Ps384 => "PS384",
            Algorithm::Ps512 => "PS512",
            Algorithm::Hs256 => "HS256",
            Algorithm::Hs384 => "HS384",
            Algorithm::Hs512 => "HS512",
            Algorithm::EdDsa => "EdDSA",
            Algorithm::Es256K => "ES256K",
            Algorithm::Es256 => "ES256",
        }
    }

    /// Key family this algorithm signs with.
    #[must_use]
    pub const fn family(self) -> KeyFamily {
        match self {
            Algorithm::Rs256
            | Algorithm::Rs384
            | Algorithm::Rs512
            | Algorithm::Ps256
            | Algorithm::Ps384
            | Algorithm::Ps512 => KeyFamily::Rsa,
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => KeyFamily::Symmetric,
            Algorithm::EdDsa => KeyFamily::Ed25519,
            Algorithm::Es256K => KeyFamily::Secp256k1,
            Algorithm::Es256 => KeyFamily::P256,
        }
    }

    /// Hash used by RSA and HMAC algorithms; `None` for curve algorithms,
    /// whose hash is fixed by the curve.
    #[must_use]
    pub const fn sha(self) -> Option<ShaSize> {
        match self {
            Algorithm::Rs256 | Algorithm::Ps256 | Algorithm::Hs256 => Some(ShaSize::Sha256),
            Algorithm::Rs384 | Algorithm::Ps384 | Algorithm::Hs384 => Some(ShaSize::Sha384),
            Algorithm::Rs512 | Algorithm::Ps512 | Algorithm::Hs512 => Some(ShaSize::Sha512),
            Algorithm::EdDsa | Algorithm::Es256K | Algorithm::Es256 => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JwtError::unsupported_algorithm(s))
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
