//! Compact JWT (JWS) model plus two independent engines over it.
//!
//! - [`ReferenceEngine`] signs straight from native key objects with a
//!   dynamic JSON payload.
//! - [`TargetEngine`] re-imports every key from its JWK export and works
//!   with typed claims.
//!
//! Both implement [`JwtEngine`], so a harness can sign with one and verify
//! with the other across the whole [`Algorithm`] matrix.

pub mod algorithms;
pub mod claims;
mod error;
pub mod jwk;
pub mod keys;
mod reference;
mod target;
pub mod traits;
mod types;
pub mod untrusted;
pub mod validation;

pub use algorithms::{Algorithm, KeyFamily, ShaSize};
pub use claims::{ClaimsDiff, ClaimsSet};
pub use error::*;
pub use jwk::JsonWebKey;
pub use keys::{KeyMaterial, KeyProvider};
pub use reference::ReferenceEngine;
pub use target::TargetEngine;
pub use traits::{JwtEngine, SignOptions, TokenSigner, TokenVerifier};
pub use types::*;
pub use untrusted::{decode_unverified, UntrustedToken};
pub use validation::TimeOptions;
