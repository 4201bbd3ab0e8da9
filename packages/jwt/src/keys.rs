//! Key material provider: fresh per-algorithm keys and their JWK export.

use crate::{
    algorithms::{Algorithm, KeyFamily},
    error::{JwtError, JwtResult},
    jwk::{Base64UrlBytes, JsonWebKey, CURVE_ED25519, CURVE_P256, CURVE_SECP256K1},
};
use rand::RngCore;
use rand_core::OsRng;
use rsa::{
    traits::{PrivateKeyParts, PublicKeyParts},
    BigUint, RsaPrivateKey,
};
use std::fmt;
use zeroize::Zeroizing;

/// Native key of one family. Asymmetric variants hold the private half; the
/// public half is derived on demand.
#[derive(Clone)]
pub(crate) enum KeyPair {
    Rsa(Box<RsaPrivateKey>),
    Symmetric(Zeroizing<Vec<u8>>),
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    P256(p256::ecdsa::SigningKey),
}

/// Key pair or shared secret, tagged with the algorithm it was generated for.
#[derive(Clone)]
pub struct KeyMaterial {
    algorithm: Algorithm,
    pair: KeyPair,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("family", &self.family())
            .field("thumbprint", &self.thumbprint())
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Algorithm the key was generated for.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Key family.
    #[must_use]
    pub fn family(&self) -> KeyFamily {
        match &self.pair {
            KeyPair::Rsa(_) => KeyFamily::Rsa,
            KeyPair::Symmetric(_) => KeyFamily::Symmetric,
            KeyPair::Ed25519(_) => KeyFamily::Ed25519,
            KeyPair::Secp256k1(_) => KeyFamily::Secp256k1,
            KeyPair::P256(_) => KeyFamily::P256,
        }
    }

    pub(crate) fn pair(&self) -> &KeyPair {
        &self.pair
    }

    /// Check that this key can be used with `algorithm`.
    ///
    /// # Errors
    /// Returns `KeyAlgorithmMismatch` if the families differ.
    pub fn ensure_algorithm(&self, algorithm: Algorithm) -> JwtResult<()> {
        if self.family() == algorithm.family() {
            Ok(())
        } else {
            Err(JwtError::key_mismatch(algorithm, self.family()))
        }
    }

    /// Full JWK export, private members included.
    #[must_use]
    pub fn to_jwk(&self) -> JsonWebKey {
        match &self.pair {
            KeyPair::Rsa(private) => {
                let primes = private.primes();
                let member = |value: &BigUint| Base64UrlBytes::new(value.to_bytes_be());
                JsonWebKey::Rsa {
                    n: member(private.n()),
                    e: member(private.e()),
                    d: Some(member(private.d())),
                    p: primes.first().map(member),
                    q: primes.get(1).map(member),
                    dp: private.dp().map(member),
                    dq: private.dq().map(member),
                    qi: private.crt_coefficient().as_ref().map(member),
                }
            }
            KeyPair::Symmetric(secret) => JsonWebKey::Symmetric {
                k: Base64UrlBytes::new(secret.to_vec()),
            },
            KeyPair::Ed25519(signing) => JsonWebKey::OctetKeyPair {
                crv: CURVE_ED25519.to_string(),
                x: Base64UrlBytes::new(signing.verifying_key().to_bytes().to_vec()),
                d: Some(Base64UrlBytes::new(signing.to_bytes().to_vec())),
            },
            KeyPair::Secp256k1(signing) => {
                let point = signing.verifying_key().to_encoded_point(false);
                JsonWebKey::EllipticCurve {
                    crv: CURVE_SECP256K1.to_string(),
                    x: Base64UrlBytes::new(point.x().map(|x| x.to_vec()).unwrap_or_default()),
                    y: Base64UrlBytes::new(point.y().map(|y| y.to_vec()).unwrap_or_default()),
                    d: Some(Base64UrlBytes::new(signing.to_bytes().to_vec())),
                }
            }
            KeyPair::P256(signing) => {
                let point = signing.verifying_key().to_encoded_point(false);
                JsonWebKey::EllipticCurve {
                    crv: CURVE_P256.to_string(),
                    x: Base64UrlBytes::new(point.x().map(|x| x.to_vec()).unwrap_or_default()),
                    y: Base64UrlBytes::new(point.y().map(|y| y.to_vec()).unwrap_or_default()),
                    d: Some(Base64UrlBytes::new(signing.to_bytes().to_vec())),
                }
            }
        }
    }

    /// JWK export without private members (the secret itself for HMAC keys).
    #[must_use]
    pub fn to_public_jwk(&self) -> JsonWebKey {
        self.to_jwk().to_public()
    }

    /// RFC 7638 thumbprint of the public key.
    #[must_use]
    pub fn thumbprint(&self) -> String {
        self.to_public_jwk().thumbprint()
    }

    /// Import a private JWK back into native key material.
    ///
    /// # Errors
    /// Returns `KeyAlgorithmMismatch` if the JWK family does not match
    /// `algorithm`, and `InvalidKey` if private members are missing or invalid.
    pub fn from_jwk(jwk: &JsonWebKey, algorithm: Algorithm) -> JwtResult<Self> {
        jwk.ensure_algorithm(algorithm)?;
        let missing = || JwtError::invalid_key("JWK has no private members");
        let pair = match jwk {
            JsonWebKey::Rsa { n, e, d, p, q, .. } => {
                let uint = |bytes: &Base64UrlBytes| BigUint::from_bytes_be(bytes.as_bytes());
                let (d, p, q) = match (d, p, q) {
                    (Some(d), Some(p), Some(q)) => (uint(d), uint(p), uint(q)),
                    _ => return Err(missing()),
                };
                let mut private = RsaPrivateKey::from_components(uint(n), uint(e), d, vec![p, q])
                    .map_err(|e| JwtError::InvalidKey(format!("RSA components: {e}")))?;
                private
                    .precompute()
                    .map_err(|e| JwtError::InvalidKey(format!("RSA precompute: {e}")))?;
                KeyPair::Rsa(Box::new(private))
            }
            JsonWebKey::Symmetric { k } => KeyPair::Symmetric(Zeroizing::new(k.as_bytes().to_vec())),
            JsonWebKey::OctetKeyPair { d, .. } => {
                let d = d.as_ref().ok_or_else(missing)?;
                let seed: [u8; 32] = d
                    .as_bytes()
                    .try_into()
                    .map_err(|_| JwtError::invalid_key("Ed25519 seed must be 32 bytes"))?;
                KeyPair::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed))
            }
            JsonWebKey::EllipticCurve { d, .. } => {
                let d = d.as_ref().ok_or_else(missing)?;
                match algorithm.family() {
                    KeyFamily::Secp256k1 => KeyPair::Secp256k1(
                        k256::ecdsa::SigningKey::from_slice(d.as_bytes())
                            .map_err(|_| JwtError::invalid_key("invalid secp256k1 scalar"))?,
                    ),
                    _ => KeyPair::P256(
                        p256::ecdsa::SigningKey::from_slice(d.as_bytes())
                            .map_err(|_| JwtError::invalid_key("invalid P-256 scalar"))?,
                    ),
                }
            }
        };
        let key = Self { algorithm, pair };
        if key.to_public_jwk() != jwk.to_public() {
            return Err(JwtError::invalid_key("JWK public members do not match the private key"));
        }
        Ok(key)
    }
}

/// Generates algorithm-appropriate keys.
#[derive(Debug, Clone)]
pub struct KeyProvider {
    rsa_modulus_bits: usize,
}

impl Default for KeyProvider {
    fn default() -> Self {
        Self {
            rsa_modulus_bits: Self::MIN_RSA_MODULUS_BITS,
        }
    }
}

impl KeyProvider {
    /// Smallest RSA modulus the provider will generate.
    pub const MIN_RSA_MODULUS_BITS: usize = 2048;

    /// Provider generating RSA keys of `rsa_modulus_bits`.
    ///
    /// # Errors
    /// Returns `InvalidKey` below [`Self::MIN_RSA_MODULUS_BITS`].
    pub fn new(rsa_modulus_bits: usize) -> JwtResult<Self> {
        if rsa_modulus_bits < Self::MIN_RSA_MODULUS_BITS {
            return Err(JwtError::InvalidKey(format!(
                "RSA modulus must be at least {} bits, got {rsa_modulus_bits}",
                Self::MIN_RSA_MODULUS_BITS
            )));
        }
        Ok(Self { rsa_modulus_bits })
    }

    /// Configured RSA modulus length.
    #[must_use]
    pub fn rsa_modulus_bits(&self) -> usize {
        self.rsa_modulus_bits
    }

    /// Generate fresh key material for `algorithm`.
    ///
    /// # Errors
    /// Returns `InvalidKey` if RSA key generation fails.
    pub fn generate(&self, algorithm: Algorithm) -> JwtResult<KeyMaterial> {
        let pair = match algorithm.family() {
            KeyFamily::Rsa => {
                let private = RsaPrivateKey::new(&mut OsRng, self.rsa_modulus_bits)
                    .map_err(|e| JwtError::InvalidKey(format!("RSA key generation: {e}")))?;
                KeyPair::Rsa(Box::new(private))
            }
            KeyFamily::Symmetric => {
                // Secret as long as the hash output.
                let len = algorithm
                    .sha()
                    .map(|sha| sha.output_len())
                    .ok_or_else(|| JwtError::internal("HMAC algorithm without a hash"))?;
                let mut secret = Zeroizing::new(vec![0u8; len]);
                rand::rng().fill_bytes(secret.as_mut_slice());
                KeyPair::Symmetric(secret)
            }
            KeyFamily::Ed25519 => KeyPair::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng)),
            KeyFamily::Secp256k1 => KeyPair::Secp256k1(k256::ecdsa::SigningKey::random(&mut OsRng)),
            KeyFamily::P256 => KeyPair::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
        };
        let key = KeyMaterial { algorithm, pair };
        tracing::debug!(
            algorithm = %algorithm,
            family = %key.family(),
            thumbprint = %key.thumbprint(),
            "generated key material"
        );
        Ok(key)
    }

    /// Generate key material for an algorithm given by its JWS name.
    ///
    /// # Errors
    /// Returns `UnsupportedAlgorithm` for names outside the matrix.
    pub fn generate_named(&self, name: &str) -> JwtResult<KeyMaterial> {
        self.generate(name.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_rsa_modulus() {
        assert!(matches!(
            KeyProvider::new(1024),
            Err(JwtError::InvalidKey(_))
        ));
        assert_eq!(KeyProvider::new(3072).unwrap().rsa_modulus_bits(), 3072);
    }

    #[test]
    fn test_unknown_name_is_unsupported() {
        let provider = KeyProvider::default();
        assert!(matches!(
            provider.generate_named("ES512"),
            Err(JwtError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_hmac_secrets_match_hash_size() {
        let provider = KeyProvider::default();
        for (alg, len) in [
            (Algorithm::Hs256, 32),
            (Algorithm::Hs384, 48),
            (Algorithm::Hs512, 64),
        ] {
            let key = provider.generate(alg).unwrap();
            match key.to_jwk() {
                JsonWebKey::Symmetric { k } => assert_eq!(k.as_bytes().len(), len),
                other => panic!("unexpected JWK {other:?}"),
            }
        }
    }

    #[test]
    fn test_curve_keys_export_expected_members() {
        let provider = KeyProvider::default();
        for alg in [Algorithm::EdDsa, Algorithm::Es256K, Algorithm::Es256] {
            let key = provider.generate(alg).unwrap();
            let jwk = key.to_jwk();
            assert_eq!(jwk.family().unwrap(), alg.family());
            assert!(jwk.is_private());
            match &jwk {
                JsonWebKey::OctetKeyPair { x, d, .. } => {
                    assert_eq!(x.as_bytes().len(), 32);
                    assert_eq!(d.as_ref().map(|d| d.as_bytes().len()), Some(32));
                }
                JsonWebKey::EllipticCurve { x, y, .. } => {
                    assert_eq!(x.as_bytes().len(), 32);
                    assert_eq!(y.as_bytes().len(), 32);
                }
                other => panic!("unexpected JWK {other:?}"),
            }
        }
    }

    #[test]
    fn test_jwk_import_is_lossless() {
        let provider = KeyProvider::default();
        for alg in [Algorithm::Rs256, Algorithm::Hs384, Algorithm::EdDsa, Algorithm::Es256K, Algorithm::Es256] {
            let key = provider.generate(alg).unwrap();
            let json = serde_json::to_string(&key.to_jwk()).unwrap();
            let jwk: JsonWebKey = serde_json::from_str(&json).unwrap();
            let imported = KeyMaterial::from_jwk(&jwk, alg).unwrap();
            assert_eq!(imported.to_jwk(), key.to_jwk());
            assert_eq!(imported.thumbprint(), key.thumbprint());
        }
    }

    #[test]
    fn test_public_import_is_rejected() {
        let key = KeyProvider::default().generate(Algorithm::Es256).unwrap();
        assert!(matches!(
            KeyMaterial::from_jwk(&key.to_public_jwk(), Algorithm::Es256),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_spliced_public_members_are_rejected() {
        let provider = KeyProvider::default();
        for alg in [Algorithm::EdDsa, Algorithm::Es256K, Algorithm::Es256] {
            let (ours, theirs) = (provider.generate(alg).unwrap(), provider.generate(alg).unwrap());
            let spliced = match (ours.to_jwk(), theirs.to_jwk()) {
                (
                    JsonWebKey::OctetKeyPair { crv, d, .. },
                    JsonWebKey::OctetKeyPair { x, .. },
                ) => JsonWebKey::OctetKeyPair { crv, x, d },
                (
                    JsonWebKey::EllipticCurve { crv, d, .. },
                    JsonWebKey::EllipticCurve { x, y, .. },
                ) => JsonWebKey::EllipticCurve { crv, x, y, d },
                other => panic!("unexpected JWKs {other:?}"),
            };
            assert!(
                matches!(KeyMaterial::from_jwk(&spliced, alg), Err(JwtError::InvalidKey(_))),
                "{alg}"
            );
        }
    }

    #[test]
    fn test_mismatched_family_is_rejected() {
        let key = KeyProvider::default().generate(Algorithm::Es256K).unwrap();
        assert!(key.ensure_algorithm(Algorithm::Es256K).is_ok());
        assert!(matches!(
            key.ensure_algorithm(Algorithm::Es256),
            Err(JwtError::KeyAlgorithmMismatch { .. })
        ));
        assert!(matches!(
            KeyMaterial::from_jwk(&key.to_jwk(), Algorithm::Es256),
            Err(JwtError::KeyAlgorithmMismatch { .. })
        ));
    }
}
