//! Claim comparisons for the two directions of a round trip

use crossjwt_jwt::{claims::registered::EXPIRATION, ClaimsDiff, ClaimsSet};
use serde_json::json;

/// Deep equality over all members.
///
/// # Errors
/// Returns the difference when the sets are not equal.
pub fn exact(expected: &ClaimsSet, actual: &ClaimsSet) -> Result<(), ClaimsDiff> {
    let diff = expected.diff(actual);
    if diff.is_empty() {
        Ok(())
    } else {
        Err(diff)
    }
}

/// Equality ignoring the value of `exp`, which must still be present and
/// numeric in `actual`.
///
/// # Errors
/// Returns the difference, including a bad or missing `exp`.
pub fn ignoring_expiration(expected: &ClaimsSet, actual: &ClaimsSet) -> Result<(), ClaimsDiff> {
    let mut diff = expected.without(EXPIRATION).diff(&actual.without(EXPIRATION));
    match actual.get(EXPIRATION) {
        Some(exp) if exp.is_number() => {}
        Some(exp) => {
            diff.changed.push((EXPIRATION.to_string(), json!("<numeric date>"), exp.clone()));
        }
        None => diff.missing.push((EXPIRATION.to_string(), json!("<numeric date>"))),
    }
    if diff.is_empty() {
        Ok(())
    } else {
        Err(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: serde_json::Value) -> ClaimsSet {
        ClaimsSet::from_value(value).unwrap()
    }

    #[test]
    fn test_exact_reports_every_difference() {
        let expected = claims(json!({ "sub": "a", "admin": false, "exp": 10 }));
        let actual = claims(json!({ "sub": "a", "admin": true, "extra": 1 }));
        let diff = exact(&expected, &actual).unwrap_err();
        assert_eq!(diff.missing.len(), 1);
        assert_eq!(diff.unexpected.len(), 1);
        assert_eq!(diff.changed.len(), 1);
    }

    #[test]
    fn test_exp_value_is_ignored_but_type_checked() {
        let expected = claims(json!({ "sub": "a", "iat": 1, "exp": 10 }));
        let later = claims(json!({ "sub": "a", "iat": 1, "exp": 99 }));
        assert!(ignoring_expiration(&expected, &later).is_ok());

        let textual = claims(json!({ "sub": "a", "iat": 1, "exp": "10" }));
        let diff = ignoring_expiration(&expected, &textual).unwrap_err();
        assert_eq!(diff.changed[0].0, "exp");

        let fractional = claims(json!({ "sub": "a", "iat": 1, "exp": 99.5 }));
        assert!(ignoring_expiration(&expected, &fractional).is_ok());

        let diff =
            ignoring_expiration(&expected, &claims(json!({ "sub": "a", "iat": 1 }))).unwrap_err();
        assert_eq!(diff.missing[0].0, "exp");
    }

    #[test]
    fn test_other_members_still_compared() {
        let expected = claims(json!({ "sub": "a", "iat": 1, "exp": 10 }));
        let actual = claims(json!({ "sub": "b", "iat": 1, "exp": 10 }));
        assert!(ignoring_expiration(&expected, &actual).is_err());
    }
}
