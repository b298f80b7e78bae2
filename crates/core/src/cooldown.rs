//! Cooldown rule between two attempts.

use chrono::{DateTime, Duration, Utc};

use crate::model::Attempt;

/// Days a user must wait after a completed attempt.
pub const RESET_DAYS: i64 = 7;

/// Whether a user may start an attempt right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    Allowed,
    Locked(CooldownLock),
}

impl Eligibility {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Eligibility::Allowed)
    }
}

/// A denied start, with the moment the lock lifts.
///
/// The lock is a snapshot. Once `has_expired` turns true the caller must
/// query again instead of trusting this value.
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownLock {
    pub retry_at: DateTime<Utc>,
    pub last_attempt: Attempt,
}

impl CooldownLock {
    #[must_use]
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.retry_at
    }

    /// Time left until `retry_at`, zero once it has passed.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.retry_at - now).max(Duration::zero())
    }
}

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days since `attempt` completed; negative if `now` is earlier.
#[must_use]
pub fn days_since(attempt: &Attempt, now: DateTime<Utc>) -> f64 {
    let delta = now - attempt.completed_at();
    delta.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Decide eligibility from the user's last stored attempt.
#[must_use]
pub fn evaluate(last_attempt: Option<&Attempt>, now: DateTime<Utc>) -> Eligibility {
    let Some(attempt) = last_attempt else {
        return Eligibility::Allowed;
    };

    let retry_at = attempt.completed_at() + Duration::days(RESET_DAYS);
    if now >= retry_at {
        Eligibility::Allowed
    } else {
        Eligibility::Locked(CooldownLock {
            retry_at,
            last_attempt: attempt.clone(),
        })
    }
}
