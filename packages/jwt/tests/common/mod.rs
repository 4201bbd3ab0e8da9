//! Shared fixtures for the engine tests.
#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use crossjwt_jwt::{
    Algorithm, ClaimsSet, JsonWebKey, KeyFamily, KeyMaterial, KeyProvider, Token,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::OnceLock;

/// Key for `algorithm`. One RSA key is shared by all RSA algorithms.
pub fn key_for(algorithm: Algorithm) -> KeyMaterial {
    static RSA: OnceLock<KeyMaterial> = OnceLock::new();
    if algorithm.family() == KeyFamily::Rsa {
        return RSA
            .get_or_init(|| KeyProvider::default().generate(Algorithm::Rs256).unwrap())
            .clone();
    }
    KeyProvider::default().generate(algorithm).unwrap()
}

pub fn john_doe() -> ClaimsSet {
    ClaimsSet::new().with("name", "John Doe").with("admin", false)
}

/// Flip bits in one byte of the decoded signature and re-encode it.
pub fn flip_signature_byte(token: &Token, index: usize, mask: u8) -> Token {
    let parts = token.parts().unwrap();
    let mut signature = URL_SAFE_NO_PAD.decode(parts.signature).unwrap();
    let index = index % signature.len();
    signature[index] ^= mask;
    Token::new(format!(
        "{}.{}",
        parts.signing_input(),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Swap the payload segment for `payload`, keeping header and signature.
pub fn replace_payload(token: &Token, payload: &serde_json::Value) -> Token {
    let parts = token.parts().unwrap();
    Token::new(format!(
        "{}.{}.{}",
        parts.header,
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap()),
        parts.signature
    ))
}

/// HS256 token over an arbitrary payload, signed outside both engines.
pub fn hs256_token(key: &KeyMaterial, payload: &serde_json::Value) -> Token {
    let JsonWebKey::Symmetric { k } = key.to_jwk() else {
        panic!("not an HMAC key");
    };
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap())
    );
    let mut mac = Hmac::<Sha256>::new_from_slice(k.as_bytes()).unwrap();
    mac.update(signing_input.as_bytes());
    let tag = mac.finalize().into_bytes();
    Token::new(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(tag)))
}
