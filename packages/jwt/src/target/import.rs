//! Import of foreign key types from their JWK form.

use crate::{
    error::{JwtError, JwtResult},
    jwk::{Base64UrlBytes, JsonWebKey, CURVE_ED25519, CURVE_P256, CURVE_SECP256K1},
};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

/// Construction of a key from a JSON Web Key.
pub(crate) trait FromJwk: Sized {
    /// Parse `jwk`, rejecting keys of another type or curve.
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self>;
}

fn wrong_type(expected: &str, jwk: &JsonWebKey) -> JwtError {
    JwtError::InvalidKey(format!("expected {expected} key, got {}", jwk.key_type()))
}

fn private_member<'a>(member: &'a Option<Base64UrlBytes>, name: &str) -> JwtResult<&'a [u8]> {
    member
        .as_ref()
        .map(Base64UrlBytes::as_bytes)
        .ok_or_else(|| JwtError::InvalidKey(format!("missing private member `{name}`")))
}

fn uint(bytes: &Base64UrlBytes) -> BigUint {
    BigUint::from_bytes_be(bytes.as_bytes())
}

/// Shared HMAC secret.
pub(crate) struct HmacKey(Zeroizing<Vec<u8>>);

impl HmacKey {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromJwk for HmacKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        match jwk {
            JsonWebKey::Symmetric { k } => Ok(Self(Zeroizing::new(k.as_bytes().to_vec()))),
            other => Err(wrong_type("oct", other)),
        }
    }
}

impl FromJwk for RsaPublicKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        match jwk {
            JsonWebKey::Rsa { n, e, .. } => RsaPublicKey::new(uint(n), uint(e))
                .map_err(|e| JwtError::InvalidKey(format!("RSA public key: {e}"))),
            other => Err(wrong_type("RSA", other)),
        }
    }
}

impl FromJwk for RsaPrivateKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        let JsonWebKey::Rsa { n, e, d, p, q, .. } = jwk else {
            return Err(wrong_type("RSA", jwk));
        };
        let d = BigUint::from_bytes_be(private_member(d, "d")?);
        let primes = vec![
            BigUint::from_bytes_be(private_member(p, "p")?),
            BigUint::from_bytes_be(private_member(q, "q")?),
        ];
        let key = RsaPrivateKey::from_components(uint(n), uint(e), d, primes)
            .map_err(|e| JwtError::InvalidKey(format!("RSA private key: {e}")))?;
        key.validate()
            .map_err(|e| JwtError::InvalidKey(format!("RSA private key: {e}")))?;
        Ok(key)
    }
}

fn okp_public(jwk: &JsonWebKey) -> JwtResult<ed25519_dalek::VerifyingKey> {
    let JsonWebKey::OctetKeyPair { crv, x, .. } = jwk else {
        return Err(wrong_type("OKP", jwk));
    };
    if crv != CURVE_ED25519 {
        return Err(JwtError::InvalidKey(format!("unsupported OKP curve `{crv}`")));
    }
    let x: &[u8; 32] = x
        .as_bytes()
        .try_into()
        .map_err(|_| JwtError::invalid_key("Ed25519 public key must be 32 bytes"))?;
    ed25519_dalek::VerifyingKey::from_bytes(x)
        .map_err(|_| JwtError::invalid_key("Ed25519 public key is not a valid point"))
}

impl FromJwk for ed25519_dalek::VerifyingKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        okp_public(jwk)
    }
}

impl FromJwk for ed25519_dalek::SigningKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        let public = okp_public(jwk)?;
        let JsonWebKey::OctetKeyPair { d, .. } = jwk else {
            return Err(wrong_type("OKP", jwk));
        };
        let seed: &[u8; 32] = private_member(d, "d")?
            .try_into()
            .map_err(|_| JwtError::invalid_key("Ed25519 seed must be 32 bytes"))?;
        let key = ed25519_dalek::SigningKey::from_bytes(seed);
        if key.verifying_key() != public {
            return Err(JwtError::invalid_key("Ed25519 `x` does not match `d`"));
        }
        Ok(key)
    }
}

/// Uncompressed SEC1 encoding of an `EC` key on `curve`.
fn ec_point(jwk: &JsonWebKey, curve: &str) -> JwtResult<Vec<u8>> {
    let JsonWebKey::EllipticCurve { crv, x, y, .. } = jwk else {
        return Err(wrong_type("EC", jwk));
    };
    if crv != curve {
        return Err(JwtError::InvalidKey(format!(
            "expected curve `{curve}`, got `{crv}`"
        )));
    }
    let mut point = Vec::with_capacity(1 + x.as_bytes().len() + y.as_bytes().len());
    point.push(0x04);
    point.extend_from_slice(x.as_bytes());
    point.extend_from_slice(y.as_bytes());
    Ok(point)
}

fn ec_scalar(jwk: &JsonWebKey) -> JwtResult<&[u8]> {
    match jwk {
        JsonWebKey::EllipticCurve { d, .. } => private_member(d, "d"),
        other => Err(wrong_type("EC", other)),
    }
}

impl FromJwk for p256::ecdsa::VerifyingKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        Self::from_sec1_bytes(&ec_point(jwk, CURVE_P256)?)
            .map_err(|_| JwtError::invalid_key("invalid P-256 point"))
    }
}

impl FromJwk for p256::ecdsa::SigningKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        let public = p256::ecdsa::VerifyingKey::from_jwk(jwk)?;
        let key = Self::from_slice(ec_scalar(jwk)?)
            .map_err(|_| JwtError::invalid_key("invalid P-256 scalar"))?;
        if *key.verifying_key() != public {
            return Err(JwtError::invalid_key("P-256 point does not match `d`"));
        }
        Ok(key)
    }
}

impl FromJwk for k256::ecdsa::VerifyingKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        Self::from_sec1_bytes(&ec_point(jwk, CURVE_SECP256K1)?)
            .map_err(|_| JwtError::invalid_key("invalid secp256k1 point"))
    }
}

impl FromJwk for k256::ecdsa::SigningKey {
    fn from_jwk(jwk: &JsonWebKey) -> JwtResult<Self> {
        let public = k256::ecdsa::VerifyingKey::from_jwk(jwk)?;
        let key = Self::from_slice(ec_scalar(jwk)?)
            .map_err(|_| JwtError::invalid_key("invalid secp256k1 scalar"))?;
        if *key.verifying_key() != public {
            return Err(JwtError::invalid_key("secp256k1 point does not match `d`"));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::Algorithm, keys::KeyProvider};

    #[test]
    fn test_public_jwk_is_not_a_signing_key() {
        let key = KeyProvider::default().generate(Algorithm::Es256K).unwrap();
        let public = key.to_public_jwk();
        assert!(k256::ecdsa::VerifyingKey::from_jwk(&public).is_ok());
        assert!(matches!(
            k256::ecdsa::SigningKey::from_jwk(&public),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_curve_is_checked() {
        let key = KeyProvider::default().generate(Algorithm::Es256).unwrap();
        assert!(p256::ecdsa::SigningKey::from_jwk(&key.to_jwk()).is_ok());
        assert!(k256::ecdsa::VerifyingKey::from_jwk(&key.to_jwk()).is_err());
    }

    #[test]
    fn test_mismatched_ed25519_halves_are_rejected() {
        let a = KeyProvider::default().generate(Algorithm::EdDsa).unwrap().to_jwk();
        let b = KeyProvider::default().generate(Algorithm::EdDsa).unwrap().to_jwk();
        let (JsonWebKey::OctetKeyPair { crv, x, .. }, JsonWebKey::OctetKeyPair { d, .. }) = (a, b)
        else {
            panic!("expected OKP keys");
        };
        let spliced = JsonWebKey::OctetKeyPair { crv, x, d };
        assert!(ed25519_dalek::SigningKey::from_jwk(&spliced).is_err());
    }
}
