//! Time source and leeway shared by signers (stamping) and verifiers (expiry).

use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::{fmt, sync::Arc};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Clock and leeway used for time-based claims.
#[derive(Clone)]
pub struct TimeOptions {
    /// Leeway applied when checking `exp`.
    pub leeway: Duration,
    clock: Clock,
}

impl Default for TimeOptions {
    fn default() -> Self {
        Self {
            leeway: Duration::zero(),
            clock: Arc::new(Utc::now),
        }
    }
}

impl fmt::Debug for TimeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeOptions")
            .field("leeway", &self.leeway)
            .field("now", &self.now())
            .finish()
    }
}

impl TimeOptions {
    /// Options with a custom clock.
    pub fn new(leeway: Duration, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            leeway,
            clock: Arc::new(clock),
        }
    }

    /// Options whose clock always reads `at`.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::new(Duration::zero(), move || at)
    }

    /// Set the leeway.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Check the `exp` member of a decoded payload, if present. `exp` is a
    /// NumericDate and may carry a fractional part.
    ///
    /// # Errors
    /// Returns `MalformedToken` if `exp` is not a number and `TokenExpired`
    /// if it has elapsed.
    pub fn check_claims_expiration(&self, exp: Option<&Value>) -> JwtResult<()> {
        match exp {
            None => Ok(()),
            Some(value) => {
                let exp = value
                    .as_f64()
                    .ok_or_else(|| JwtError::malformed("exp must be a numeric date"))?;
                self.check_expiration(exp)
            }
        }
    }

    /// Reject an elapsed expiration. A token is expired once
    /// `now >= exp + leeway`.
    ///
    /// # Errors
    /// Returns `TokenExpired` if `exp` has elapsed.
    pub fn check_expiration(&self, exp: f64) -> JwtResult<()> {
        let now = self.now().timestamp();
        if now as f64 >= exp + self.leeway.num_seconds() as f64 {
            return Err(JwtError::TokenExpired {
                expired_at: exp.floor() as i64,
                now,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at_noon() -> TimeOptions {
        TimeOptions::fixed(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let time = at_noon();
        assert_eq!(time.now(), time.now());
    }

    #[test]
    fn test_expiry_boundary() {
        let time = at_noon();
        let now = time.now().timestamp();
        let exp = now as f64;
        assert!(time.check_expiration(exp + 1.0).is_ok());
        assert_eq!(
            time.check_expiration(exp),
            Err(JwtError::TokenExpired {
                expired_at: now,
                now
            })
        );
        assert!(time.check_expiration(exp - 3600.0).is_err());
    }

    #[test]
    fn test_leeway_extends_validity() {
        let time = at_noon().with_leeway(Duration::seconds(30));
        let now = time.now().timestamp() as f64;
        assert!(time.check_expiration(now - 10.0).is_ok());
        assert!(time.check_expiration(now - 30.0).is_err());
    }

    #[test]
    fn test_fractional_exp_is_a_numeric_date() {
        let time = at_noon();
        let now = time.now().timestamp() as f64;
        assert!(time.check_claims_expiration(Some(&json!(now + 0.5))).is_ok());
        assert!(matches!(
            time.check_claims_expiration(Some(&json!(now - 0.5))),
            Err(JwtError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_non_numeric_exp_is_malformed() {
        let time = at_noon();
        assert!(time.check_claims_expiration(None).is_ok());
        assert!(matches!(
            time.check_claims_expiration(Some(&json!("tomorrow"))),
            Err(JwtError::MalformedToken(_))
        ));
        assert!(matches!(
            time.check_claims_expiration(Some(&json!(null))),
            Err(JwtError::MalformedToken(_))
        ));
    }
}
