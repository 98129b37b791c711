//! Minimum interval between aggregation runs.
//!
//! The gate holds no state of its own: callers pass the `lastUpdate` of the
//! snapshot they just read from durable storage, so every decision reflects
//! the latest committed run rather than an in-process view.

use chrono::TimeDelta;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default cooldown between aggregation runs.
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 60;

/// Outcome of a trigger admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The cooldown has elapsed, or no snapshot exists yet.
    Accepted,
    /// The cooldown is still running but a valid override credential was given.
    Bypassed { remaining: TimeDelta },
    /// The cooldown is still running.
    RateLimited { remaining: TimeDelta },
}

impl Admission {
    /// Convert into a `Result`, mapping a rejection to [`CoreError::RateLimited`].
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Admission::Accepted | Admission::Bypassed { .. } => Ok(()),
            Admission::RateLimited { remaining } => Err(CoreError::RateLimited { remaining }),
        }
    }
}

/// Cooldown gate with an optional shared-secret override.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    interval: TimeDelta,
    override_secret: Option<String>,
}

impl CooldownGate {
    /// Create a gate. A blank `override_secret` disables the override path.
    pub fn new(interval: TimeDelta, override_secret: Option<String>) -> Self {
        Self {
            interval,
            override_secret: override_secret.filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// Decide whether a trigger at `now` may run.
    pub fn check(
        &self,
        last_update: Option<Timestamp>,
        credential: Option<&str>,
        now: Timestamp,
    ) -> Admission {
        let Some(last_update) = last_update else {
            return Admission::Accepted;
        };

        let elapsed = now.signed_duration_since(last_update);
        if elapsed >= self.interval {
            return Admission::Accepted;
        }

        let remaining = self.interval - elapsed;
        if self.credential_matches(credential) {
            Admission::Bypassed { remaining }
        } else {
            Admission::RateLimited { remaining }
        }
    }

    fn credential_matches(&self, credential: Option<&str>) -> bool {
        match (&self.override_secret, credential) {
            (Some(secret), Some(given)) => secret == given,
            _ => false,
        }
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(TimeDelta::minutes(DEFAULT_COOLDOWN_MINUTES), None)
    }
}
