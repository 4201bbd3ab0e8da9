//! JSON Web Keys: the lossless interchange format between engines.
//!
//! Keys are tagged by `kty` (and `crv` for curve keys), so the family of a
//! key is always recoverable from its JSON form. Binary members are base64url
//! without padding. RFC 7638 thumbprints identify keys in logs.

use crate::{
    algorithms::{Algorithm, KeyFamily},
    error::{JwtError, JwtResult},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, fmt};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Curve name for Ed25519 `OKP` keys.
pub const CURVE_ED25519: &str = "Ed25519";
/// Curve name for secp256k1 `EC` keys.
pub const CURVE_SECP256K1: &str = "secp256k1";
/// Curve name for P-256 `EC` keys.
pub const CURVE_P256: &str = "P-256";

/// Byte string serialized as unpadded base64url. Zeroized on drop since it
/// frequently holds private key members.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Base64UrlBytes(Vec<u8>);

impl Base64UrlBytes {
    /// Wrap raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unpadded base64url text.
    #[must_use]
    pub fn encoded(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }
}

impl fmt::Debug for Base64UrlBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} bytes>", self.0.len())
    }
}

impl Serialize for Base64UrlBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded())
    }
}

impl<'de> Deserialize<'de> for Base64UrlBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        URL_SAFE_NO_PAD
            .decode(text.as_bytes())
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// A JSON Web Key for one of the supported key families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum JsonWebKey {
    /// RSA key; private members present only on private keys.
    #[serde(rename = "RSA")]
    Rsa {
        /// Modulus
        n: Base64UrlBytes,
        /// Public exponent
        e: Base64UrlBytes,
        /// Private exponent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        d: Option<Base64UrlBytes>,
        /// First prime factor
        #[serde(default, skip_serializing_if = "Option::is_none")]
        p: Option<Base64UrlBytes>,
        /// Second prime factor
        #[serde(default, skip_serializing_if = "Option::is_none")]
        q: Option<Base64UrlBytes>,
        /// First factor CRT exponent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dp: Option<Base64UrlBytes>,
        /// Second factor CRT exponent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dq: Option<Base64UrlBytes>,
        /// CRT coefficient
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qi: Option<Base64UrlBytes>,
    },
    /// Shared secret.
    #[serde(rename = "oct")]
    Symmetric {
        /// Secret bytes
        k: Base64UrlBytes,
    },
    /// Octet key pair (Ed25519).
    #[serde(rename = "OKP")]
    OctetKeyPair {
        /// Curve name
        crv: String,
        /// Public key
        x: Base64UrlBytes,
        /// Private key seed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        d: Option<Base64UrlBytes>,
    },
    /// Elliptic curve key (secp256k1, P-256).
    #[serde(rename = "EC")]
    EllipticCurve {
        /// Curve name
        crv: String,
        /// Affine x coordinate
        x: Base64UrlBytes,
        /// Affine y coordinate
        y: Base64UrlBytes,
        /// Private scalar
        #[serde(default, skip_serializing_if = "Option::is_none")]
        d: Option<Base64UrlBytes>,
    },
}

impl JsonWebKey {
    /// The `kty` member.
    #[must_use]
    pub fn key_type(&self) -> &'static str {
        match self {
            JsonWebKey::Rsa { .. } => "RSA",
            JsonWebKey::Symmetric { .. } => "oct",
            JsonWebKey::OctetKeyPair { .. } => "OKP",
            JsonWebKey::EllipticCurve { .. } => "EC",
        }
    }

    /// Key family derived from `kty` and `crv`.
    ///
    /// # Errors
    /// Returns `InvalidKey` for curves outside the conformance matrix.
    pub fn family(&self) -> JwtResult<KeyFamily> {
        match self {
            JsonWebKey::Rsa { .. } => Ok(KeyFamily::Rsa),
            JsonWebKey::Symmetric { .. } => Ok(KeyFamily::Symmetric),
            JsonWebKey::OctetKeyPair { crv, .. } if crv == CURVE_ED25519 => Ok(KeyFamily::Ed25519),
            JsonWebKey::EllipticCurve { crv, .. } if crv == CURVE_SECP256K1 => {
                Ok(KeyFamily::Secp256k1)
            }
            JsonWebKey::EllipticCurve { crv, .. } if crv == CURVE_P256 => Ok(KeyFamily::P256),
            JsonWebKey::OctetKeyPair { crv, .. } | JsonWebKey::EllipticCurve { crv, .. } => Err(
                JwtError::InvalidKey(format!("unsupported curve {crv} for kty {}", self.key_type())),
            ),
        }
    }

    /// Check that this key can be used with `algorithm`.
    ///
    /// # Errors
    /// Returns `KeyAlgorithmMismatch` if the families differ.
    pub fn ensure_algorithm(&self, algorithm: Algorithm) -> JwtResult<()> {
        let family = self.family()?;
        if family == algorithm.family() {
            Ok(())
        } else {
            Err(JwtError::key_mismatch(algorithm, family))
        }
    }

    /// Whether private members are present. Symmetric keys always count as
    /// private.
    #[must_use]
    pub fn is_private(&self) -> bool {
        match self {
            JsonWebKey::Rsa { d, .. }
            | JsonWebKey::OctetKeyPair { d, .. }
            | JsonWebKey::EllipticCurve { d, .. } => d.is_some(),
            JsonWebKey::Symmetric { .. } => true,
        }
    }

    /// Copy with every private member removed. Symmetric keys are returned
    /// unchanged, since the secret is also the verification key.
    #[must_use]
    pub fn to_public(&self) -> Self {
        match self {
            JsonWebKey::Rsa { n, e, .. } => JsonWebKey::Rsa {
                n: n.clone(),
                e: e.clone(),
                d: None,
                p: None,
                q: None,
                dp: None,
                dq: None,
                qi: None,
            },
            JsonWebKey::Symmetric { k } => JsonWebKey::Symmetric { k: k.clone() },
            JsonWebKey::OctetKeyPair { crv, x, .. } => JsonWebKey::OctetKeyPair {
                crv: crv.clone(),
                x: x.clone(),
                d: None,
            },
            JsonWebKey::EllipticCurve { crv, x, y, .. } => JsonWebKey::EllipticCurve {
                crv: crv.clone(),
                x: x.clone(),
                y: y.clone(),
                d: None,
            },
        }
    }

    /// Required members in lexicographic order, as hashed by RFC 7638.
    fn required_members(&self) -> BTreeMap<&'static str, String> {
        let mut members = BTreeMap::new();
        members.insert("kty", self.key_type().to_string());
        match self {
            JsonWebKey::Rsa { n, e, .. } => {
                members.insert("n", n.encoded());
                members.insert("e", e.encoded());
            }
            JsonWebKey::Symmetric { k } => {
                members.insert("k", k.encoded());
            }
            JsonWebKey::OctetKeyPair { crv, x, .. } => {
                members.insert("crv", crv.clone());
                members.insert("x", x.encoded());
            }
            JsonWebKey::EllipticCurve { crv, x, y, .. } => {
                members.insert("crv", crv.clone());
                members.insert("x", x.encoded());
                members.insert("y", y.encoded());
            }
        }
        members
    }

    /// RFC 7638 SHA-256 thumbprint, base64url encoded.
    #[must_use]
    pub fn thumbprint(&self) -> String {
        let canonical = self.to_string();
        URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
    }
}

/// Canonical form hashed by [`JsonWebKey::thumbprint`]: required members
/// only, sorted, no whitespace.
impl fmt::Display for JsonWebKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.required_members()) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
