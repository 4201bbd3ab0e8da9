//! Typed JWS algorithms. Each algorithm names its own key types, so a key of
//! the wrong kind cannot reach a signing primitive.

use super::import::{FromJwk, HmacKey};
use crate::{
    algorithms::ShaSize,
    error::{JwtError, JwtResult},
};
use hmac::{Hmac, Mac};
use rand_core::OsRng;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// A JWS signature algorithm.
pub(crate) trait JwsAlgorithm {
    /// Key used to produce signatures.
    type SigningKey: FromJwk;
    /// Key used to check signatures.
    type VerifyingKey: FromJwk;

    /// Registered `alg` name.
    fn name(&self) -> &'static str;

    /// Sign `message`.
    fn sign(&self, key: &Self::SigningKey, message: &[u8]) -> JwtResult<Vec<u8>>;

    /// Check `signature` over `message`. Signatures of the wrong shape are
    /// simply invalid.
    fn verify_signature(&self, key: &Self::VerifyingKey, message: &[u8], signature: &[u8])
        -> bool;
}

macro_rules! hmac_algorithm {
    ($name:ident, $digest:ty, $alg:literal) => {
        #[doc = concat!("`", $alg, "`")]
        #[derive(Debug, Clone, Copy, Default)]
        pub(crate) struct $name;

        impl JwsAlgorithm for $name {
            type SigningKey = HmacKey;
            type VerifyingKey = HmacKey;

            fn name(&self) -> &'static str {
                $alg
            }

            fn sign(&self, key: &HmacKey, message: &[u8]) -> JwtResult<Vec<u8>> {
                let mut mac = Hmac::<$digest>::new_from_slice(key.as_bytes())
                    .map_err(|_| JwtError::invalid_key("unusable HMAC key"))?;
                mac.update(message);
                Ok(mac.finalize().into_bytes().to_vec())
            }

            fn verify_signature(&self, key: &HmacKey, message: &[u8], signature: &[u8]) -> bool {
                let Ok(mut mac) = Hmac::<$digest>::new_from_slice(key.as_bytes()) else {
                    return false;
                };
                mac.update(message);
                mac.verify_slice(signature).is_ok()
            }
        }
    };
}

hmac_algorithm!(Hs256, Sha256, "HS256");
hmac_algorithm!(Hs384, Sha384, "HS384");
hmac_algorithm!(Hs512, Sha512, "HS512");

/// RSA padding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RsaPadding {
    Pkcs1v15,
    /// PSS with a salt as long as the digest.
    Pss,
}

/// `RS*` and `PS*`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rsa {
    hash: ShaSize,
    padding: RsaPadding,
}

impl Rsa {
    pub(crate) const fn new(hash: ShaSize, padding: RsaPadding) -> Self {
        Self { hash, padding }
    }

    fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self.hash {
            ShaSize::Sha256 => Sha256::digest(message).to_vec(),
            ShaSize::Sha384 => Sha384::digest(message).to_vec(),
            ShaSize::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    fn pkcs1v15(&self) -> Pkcs1v15Sign {
        match self.hash {
            ShaSize::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            ShaSize::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            ShaSize::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }

    fn pss(&self) -> Pss {
        match self.hash {
            ShaSize::Sha256 => Pss::new::<Sha256>(),
            ShaSize::Sha384 => Pss::new::<Sha384>(),
            ShaSize::Sha512 => Pss::new::<Sha512>(),
        }
    }
}

impl JwsAlgorithm for Rsa {
    type SigningKey = RsaPrivateKey;
    type VerifyingKey = RsaPublicKey;

    fn name(&self) -> &'static str {
        match (self.padding, self.hash) {
            (RsaPadding::Pkcs1v15, ShaSize::Sha256) => "RS256",
            (RsaPadding::Pkcs1v15, ShaSize::Sha384) => "RS384",
            (RsaPadding::Pkcs1v15, ShaSize::Sha512) => "RS512",
            (RsaPadding::Pss, ShaSize::Sha256) => "PS256",
            (RsaPadding::Pss, ShaSize::Sha384) => "PS384",
            (RsaPadding::Pss, ShaSize::Sha512) => "PS512",
        }
    }

    fn sign(&self, key: &RsaPrivateKey, message: &[u8]) -> JwtResult<Vec<u8>> {
        let digest = self.digest(message);
        match self.padding {
            RsaPadding::Pkcs1v15 => key.sign(self.pkcs1v15(), &digest),
            RsaPadding::Pss => key.sign_with_rng(&mut OsRng, self.pss(), &digest),
        }
        .map_err(|e| JwtError::internal(&format!("{} signing failed: {e}", self.name())))
    }

    fn verify_signature(&self, key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> bool {
        let digest = self.digest(message);
        match self.padding {
            RsaPadding::Pkcs1v15 => key.verify(self.pkcs1v15(), &digest, signature),
            RsaPadding::Pss => key.verify(self.pss(), &digest, signature),
        }
        .is_ok()
    }
}

/// `EdDSA` over Ed25519.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Ed25519;

impl JwsAlgorithm for Ed25519 {
    type SigningKey = ed25519_dalek::SigningKey;
    type VerifyingKey = ed25519_dalek::VerifyingKey;

    fn name(&self) -> &'static str {
        "EdDSA"
    }

    fn sign(&self, key: &Self::SigningKey, message: &[u8]) -> JwtResult<Vec<u8>> {
        use ed25519_dalek::Signer;
        let signature = key
            .try_sign(message)
            .map_err(|e| JwtError::internal(&format!("EdDSA signing failed: {e}")))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify_signature(&self, key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
            return false;
        };
        key.verify_strict(message, &signature).is_ok()
    }
}

/// `ES256`: ECDSA over P-256 with SHA-256, fixed-width `r || s`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Es256;

impl JwsAlgorithm for Es256 {
    type SigningKey = p256::ecdsa::SigningKey;
    type VerifyingKey = p256::ecdsa::VerifyingKey;

    fn name(&self) -> &'static str {
        "ES256"
    }

    fn sign(&self, key: &Self::SigningKey, message: &[u8]) -> JwtResult<Vec<u8>> {
        use p256::ecdsa::{signature::hazmat::PrehashSigner, Signature};
        let signature: Signature = key
            .sign_prehash(&Sha256::digest(message))
            .map_err(|e| JwtError::internal(&format!("ES256 signing failed: {e}")))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify_signature(&self, key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        use p256::ecdsa::{signature::hazmat::PrehashVerifier, Signature};
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify_prehash(&Sha256::digest(message), &signature).is_ok()
    }
}

/// `ES256K`: ECDSA over secp256k1 with SHA-256, fixed-width `r || s`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Es256K;

impl JwsAlgorithm for Es256K {
    type SigningKey = k256::ecdsa::SigningKey;
    type VerifyingKey = k256::ecdsa::VerifyingKey;

    fn name(&self) -> &'static str {
        "ES256K"
    }

    fn sign(&self, key: &Self::SigningKey, message: &[u8]) -> JwtResult<Vec<u8>> {
        use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature};
        let signature: Signature = key
            .sign_prehash(&Sha256::digest(message))
            .map_err(|e| JwtError::internal(&format!("ES256K signing failed: {e}")))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify_signature(&self, key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        use k256::ecdsa::{signature::hazmat::PrehashVerifier, Signature};
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify_prehash(&Sha256::digest(message), &signature).is_ok()
    }
}
