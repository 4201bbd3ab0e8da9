//! Tampered, expired, malformed, and mismatched tokens

mod common;

use chrono::{Duration, Utc};
use common::{flip_signature_byte, john_doe, key_for, replace_payload};
use crossjwt_jwt::{
    Algorithm, JwtEngine, JwtError, KeyProvider, ReferenceEngine, TargetEngine, TimeOptions,
    Token, TokenSigner, TokenVerifier,
};
use proptest::prelude::*;
use serde_json::json;

fn engines() -> [Box<dyn JwtEngine>; 2] {
    [
        Box::new(ReferenceEngine::default()),
        Box::new(TargetEngine::default()),
    ]
}

#[test]
fn test_flipped_signature_byte_is_a_mismatch() {
    for algorithm in Algorithm::ALL {
        let key = key_for(algorithm);
        for signer in engines() {
            let token = signer
                .sign(&john_doe(), &key, algorithm, &TimeOptions::default())
                .unwrap();
            let tampered = flip_signature_byte(&token, 7, 0x01);
            for verifier in engines() {
                assert_eq!(
                    verifier.verify(&tampered, &key, &TimeOptions::default()),
                    Err(JwtError::SignatureMismatch),
                    "{algorithm}: {} -> {}",
                    signer.name(),
                    verifier.name()
                );
            }
        }
    }
}

#[test]
fn test_swapped_payload_is_a_mismatch() {
    let key = key_for(Algorithm::Ps256);
    for signer in engines() {
        let token = signer
            .sign(&john_doe(), &key, Algorithm::Ps256, &TimeOptions::default())
            .unwrap();
        let forged = replace_payload(&token, &json!({ "name": "John Doe", "admin": true }));
        for verifier in engines() {
            assert_eq!(
                verifier.verify(&forged, &key, &TimeOptions::default()),
                Err(JwtError::SignatureMismatch)
            );
        }
    }
}

#[test]
fn test_token_from_another_key_is_a_mismatch() {
    let signing_key = key_for(Algorithm::Es256);
    let other_key = key_for(Algorithm::Es256);
    for signer in engines() {
        let token = signer
            .sign(&john_doe(), &signing_key, Algorithm::Es256, &TimeOptions::default())
            .unwrap();
        for verifier in engines() {
            assert_eq!(
                verifier.verify(&token, &other_key, &TimeOptions::default()),
                Err(JwtError::SignatureMismatch)
            );
        }
    }
}

#[test]
fn test_elapsed_exp_is_rejected() {
    let key = key_for(Algorithm::Hs512);
    let two_hours_ago = Utc::now() - Duration::hours(2);
    for signer in engines() {
        let token = signer
            .sign(&john_doe(), &key, Algorithm::Hs512, &TimeOptions::fixed(two_hours_ago))
            .unwrap();
        for verifier in engines() {
            assert!(matches!(
                verifier.verify(&token, &key, &TimeOptions::default()),
                Err(JwtError::TokenExpired { .. })
            ));
            // Generous leeway accepts the same token.
            let lenient = TimeOptions::default().with_leeway(Duration::hours(2));
            assert!(verifier.verify(&token, &key, &lenient).is_ok());
        }
    }
}

#[test]
fn test_wrong_key_family_is_rejected() {
    let ed_key = key_for(Algorithm::EdDsa);
    let k1_key = key_for(Algorithm::Es256K);
    for engine in engines() {
        // Signing side
        assert!(matches!(
            engine.sign(&john_doe(), &ed_key, Algorithm::Es256, &TimeOptions::default()),
            Err(JwtError::KeyAlgorithmMismatch { .. })
        ));
        // Verifying side: an ES256K token checked with an Ed25519 key
        let token = engine
            .sign(&john_doe(), &k1_key, Algorithm::Es256K, &TimeOptions::default())
            .unwrap();
        assert!(matches!(
            engine.verify(&token, &ed_key, &TimeOptions::default()),
            Err(JwtError::KeyAlgorithmMismatch { .. })
        ));
    }
}

#[test]
fn test_unknown_or_none_alg_is_unsupported() {
    let key = key_for(Algorithm::Hs256);
    for alg in ["none", "HS1024", "hs256"] {
        let token = Token::new(format!(
            "{}.e30.",
            base64::Engine::encode(
                &base64::engine::general_purpose::URL_SAFE_NO_PAD,
                serde_json::to_vec(&json!({ "alg": alg })).unwrap()
            )
        ));
        for engine in engines() {
            assert!(matches!(
                engine.verify(&token, &key, &TimeOptions::default()),
                Err(JwtError::UnsupportedAlgorithm(_))
            ));
        }
    }
}

#[test]
fn test_wrong_segment_count_is_malformed() {
    let key = key_for(Algorithm::Hs256);
    for raw in ["", "abc", "a.b", "a.b.c.d"] {
        for engine in engines() {
            assert!(matches!(
                engine.verify(&Token::new(raw), &key, &TimeOptions::default()),
                Err(JwtError::MalformedToken(_))
            ));
        }
    }
}

#[test]
fn test_short_hmac_secret_is_refused_by_reference_only() {
    use crossjwt_jwt::{jwk::Base64UrlBytes, JsonWebKey, KeyMaterial};
    let short = KeyMaterial::from_jwk(
        &JsonWebKey::Symmetric {
            k: Base64UrlBytes::new(b"0123456789".to_vec()),
        },
        Algorithm::Hs256,
    )
    .unwrap();
    assert!(matches!(
        ReferenceEngine::default().sign(&john_doe(), &short, Algorithm::Hs256, &TimeOptions::default()),
        Err(JwtError::InvalidKey(_))
    ));
    assert!(TargetEngine::default()
        .sign(&john_doe(), &short, Algorithm::Hs256, &TimeOptions::default())
        .is_ok());
}

#[test]
fn test_rsa_provider_enforces_minimum_modulus() {
    assert!(matches!(
        KeyProvider::new(1024),
        Err(JwtError::InvalidKey(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_custom_claims_survive_both_directions(
        name in "\\PC{0,24}",
        level in any::<i64>(),
        tags in prop::collection::vec("[a-z]{1,8}", 0..4),
    ) {
        let key = key_for(Algorithm::Hs256);
        let seed = john_doe()
            .with("name", name)
            .with("level", level)
            .with("tags", tags);
        let now = Utc::now();
        let engines = engines();
        for (signer, verifier) in [(&engines[0], &engines[1]), (&engines[1], &engines[0])] {
            let token = signer.sign(&seed, &key, Algorithm::Hs256, &TimeOptions::fixed(now)).unwrap();
            let claims = verifier.verify(&token, &key, &TimeOptions::default()).unwrap();
            let expected = seed.clone().stamped(None, now, Duration::hours(1));
            prop_assert_eq!(claims, expected);
        }
    }

    #[test]
    fn prop_any_signature_bit_flip_is_detected(index in 0usize..64, bit in 0u32..8) {
        let key = key_for(Algorithm::Es256);
        let engines = engines();
        let token = engines[1].sign(&john_doe(), &key, Algorithm::Es256, &TimeOptions::default()).unwrap();
        let tampered = flip_signature_byte(&token, index, 1u8 << bit);
        for verifier in &engines {
            prop_assert_eq!(
                verifier.verify(&tampered, &key, &TimeOptions::default()),
                Err(JwtError::SignatureMismatch)
            );
        }
    }
}
