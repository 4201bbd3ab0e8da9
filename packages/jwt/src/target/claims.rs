//! Typed claims with the time-based registered claims pulled out.
//!
//! Used on the signing side only. Verification hands back the payload object
//! untouched.

use crate::claims::{registered, ClaimsSet};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl Claims {
    /// Lift `iat` out when it is an integer; any other `iat` value rides along
    /// with the custom claims. An incoming `exp` is dropped since it is always
    /// restamped.
    pub(crate) fn from_claims_set(claims: &ClaimsSet) -> Self {
        let mut custom = claims.as_map().clone();
        custom.shift_remove(registered::EXPIRATION);
        let iat = custom.get(registered::ISSUED_AT).and_then(Value::as_i64);
        if iat.is_some() {
            custom.shift_remove(registered::ISSUED_AT);
        }
        Self {
            exp: None,
            iat,
            custom,
        }
    }

    pub(crate) fn stamp(&mut self, subject: Option<&str>, now: DateTime<Utc>, ttl: Duration) {
        if let Some(sub) = subject {
            self.custom
                .entry(registered::SUBJECT)
                .or_insert_with(|| Value::String(sub.to_owned()));
        }
        if self.iat.is_none() && !self.custom.contains_key(registered::ISSUED_AT) {
            self.iat = Some(now.timestamp());
        }
        self.exp = Some((now + ttl).timestamp());
    }
}
