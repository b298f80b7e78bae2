use std::sync::Arc;

use chrono::{DateTime, Utc};
use exam_core::cooldown::{self, Eligibility, days_since};
use exam_core::model::UserId;
use storage::repository::AttemptRepository;
use tracing::{debug, warn};

use crate::Clock;

/// Store-backed cooldown check run before every attempt.
///
/// Unreadable attempt data never locks a user out: the gate fails open.
#[derive(Clone)]
pub struct CooldownGate {
    clock: Clock,
    attempts: Arc<dyn AttemptRepository>,
}

impl CooldownGate {
    #[must_use]
    pub fn new(clock: Clock, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { clock, attempts }
    }

    /// Evaluate eligibility at the service clock's current time.
    pub async fn can_start(&self, user_id: UserId) -> Eligibility {
        self.can_start_at(user_id, self.clock.now()).await
    }

    /// Evaluate eligibility at `now`.
    ///
    /// Call again rather than reusing a stale `Locked` once its `retry_at` passes.
    pub async fn can_start_at(&self, user_id: UserId, now: DateTime<Utc>) -> Eligibility {
        let last = match self.attempts.get_attempt(user_id).await {
            Ok(last) => last,
            Err(err) => {
                warn!(%user_id, error = %err, "attempt record unreadable, allowing attempt");
                return Eligibility::Allowed;
            }
        };

        if let Some(attempt) = &last {
            debug!(
                %user_id,
                elapsed_days = days_since(attempt, now),
                "found previous attempt"
            );
        }
        cooldown::evaluate(last.as_ref(), now)
    }
}
