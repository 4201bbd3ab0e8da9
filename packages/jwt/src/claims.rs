//! Claims set exchanged between engines, and value-level comparison.

use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Registered claim names used by the harness.
pub mod registered {
    /// Subject
    pub const SUBJECT: &str = "sub";
    /// Expiration time (unix seconds)
    pub const EXPIRATION: &str = "exp";
    /// Issued-at (unix seconds)
    pub const ISSUED_AT: &str = "iat";
}

/// Ordered mapping of claim names to JSON values.
///
/// Equality is by value: member order does not matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimsSet(Map<String, Value>);

impl ClaimsSet {
    /// Empty claims set.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build from a JSON value, which must be an object.
    ///
    /// # Errors
    /// Returns `MalformedToken` if the value is not a JSON object.
    pub fn from_value(value: Value) -> JwtResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(JwtError::MalformedToken(format!(
                "claims must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Set a claim, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Claim value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether the claim is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert or replace a claim, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Insert a claim only if absent.
    pub fn insert_if_absent(&mut self, name: &str, value: impl Into<Value>) {
        if !self.0.contains_key(name) {
            self.0.insert(name.to_string(), value.into());
        }
    }

    /// Remove a claim.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    /// Copy of this set without the named claim.
    #[must_use]
    pub fn without(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.remove(name);
        copy
    }

    /// `sub` as a string, if present and a string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.get(registered::SUBJECT).and_then(Value::as_str)
    }

    /// `exp` as an integer timestamp, if present and integral.
    #[must_use]
    pub fn expiration(&self) -> Option<i64> {
        self.get(registered::EXPIRATION).and_then(Value::as_i64)
    }

    /// `iat` as an integer timestamp, if present and integral.
    #[must_use]
    pub fn issued_at(&self) -> Option<i64> {
        self.get(registered::ISSUED_AT).and_then(Value::as_i64)
    }

    /// Apply the stamping rules every signer follows: `sub` and `iat` are
    /// added when absent, `exp` is always set to `now + ttl`.
    ///
    /// Engines implement these rules on their own; this is the harness-side
    /// statement of them, used to build expected claims.
    #[must_use]
    pub fn stamped(mut self, subject: Option<&str>, now: DateTime<Utc>, ttl: Duration) -> Self {
        if let Some(sub) = subject {
            self.insert_if_absent(registered::SUBJECT, sub);
        }
        self.insert_if_absent(registered::ISSUED_AT, now.timestamp());
        self.insert(registered::EXPIRATION, (now + ttl).timestamp());
        self
    }

    /// Number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate claims in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Member-by-member difference from `self` (expected) to `actual`.
    #[must_use]
    pub fn diff(&self, actual: &ClaimsSet) -> ClaimsDiff {
        let mut diff = ClaimsDiff::default();
        for (name, expected) in &self.0 {
            match actual.0.get(name) {
                None => diff.missing.push((name.clone(), expected.clone())),
                Some(found) if found != expected => {
                    diff.changed.push((name.clone(), expected.clone(), found.clone()));
                }
                Some(_) => {}
            }
        }
        for (name, found) in &actual.0 {
            if !self.0.contains_key(name) {
                diff.unexpected.push((name.clone(), found.clone()));
            }
        }
        diff
    }
}

impl From<Map<String, Value>> for ClaimsSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for ClaimsSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("<unprintable claims>"),
        }
    }
}

/// Differences between an expected and an actual claims set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimsDiff {
    /// Expected members absent from the actual set
    pub missing: Vec<(String, Value)>,
    /// Actual members absent from the expected set
    pub unexpected: Vec<(String, Value)>,
    /// Members present in both with different values: (name, expected, actual)
    pub changed: Vec<(String, Value, Value)>,
}

impl ClaimsDiff {
    /// True when both sets are equal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for ClaimsDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(no differences)");
        }
        let lines: Vec<String> = self
            .missing
            .iter()
            .map(|(name, expected)| format!("- {name}: {expected}"))
            .chain(
                self.unexpected
                    .iter()
                    .map(|(name, actual)| format!("+ {name}: {actual}")),
            )
            .chain(self.changed.iter().map(|(name, expected, actual)| {
                format!("~ {name}: expected {expected}, got {actual}")
            }))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn seed() -> ClaimsSet {
        ClaimsSet::from_value(json!({ "name": "John Doe", "admin": false })).unwrap()
    }

    #[test]
    fn test_equality_ignores_member_order() {
        let a = ClaimsSet::new().with("a", 1).with("b", 2);
        let b = ClaimsSet::new().with("b", 2).with("a", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(matches!(
            ClaimsSet::from_value(json!([1, 2])),
            Err(JwtError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_stamping_keeps_existing_subject_and_restamps_exp() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let claims = seed()
            .with("sub", "alice")
            .with("exp", 1)
            .stamped(Some("john.doe@example.com"), now, Duration::hours(1));
        assert_eq!(claims.subject(), Some("alice"));
        assert_eq!(claims.issued_at(), Some(now.timestamp()));
        assert_eq!(claims.expiration(), Some(now.timestamp() + 3600));
    }

    #[test]
    fn test_diff_reports_each_kind() {
        let expected = seed().with("sub", "a");
        let actual = seed().with("admin", true).with("extra", "x");
        let diff = expected.diff(&actual);
        assert_eq!(diff.missing, vec![("sub".to_string(), json!("a"))]);
        assert_eq!(diff.unexpected, vec![("extra".to_string(), json!("x"))]);
        assert_eq!(
            diff.changed,
            vec![("admin".to_string(), json!(false), json!(true))]
        );
        let rendered = diff.to_string();
        assert!(rendered.contains("- sub: \"a\""));
        assert!(rendered.contains("+ extra: \"x\""));
        assert!(rendered.contains("~ admin: expected false, got true"));
    }

    #[test]
    fn test_diff_of_equal_sets_is_empty() {
        assert!(seed().diff(&seed()).is_empty());
    }
}
