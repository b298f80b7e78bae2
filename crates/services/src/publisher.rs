use std::sync::Arc;

use chrono::{DateTime, Utc};
use exam_core::model::{ApplicationId, Attempt, ExamOutcome, ExamResult, Score, UserId};
use storage::repository::{ApplicationRepository, AttemptRepository};
use tracing::{error, info};

use crate::Clock;
use crate::handoff::ResultHandoff;

/// What happened to the application-record write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationWrite {
    Attached(ApplicationId),
    /// The user has no active application.
    Skipped,
    Failed,
}

/// Outcome of publishing one finished attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReceipt {
    pub result: ExamResult,
    pub attempt_saved: bool,
    pub application: ApplicationWrite,
}

/// Writes a finished attempt to the attempt store, the active application
/// and the handoff slot.
///
/// The two store writes are independent and best-effort; neither failure
/// stops the other or the handoff.
#[derive(Clone)]
pub struct ResultPublisher {
    clock: Clock,
    attempts: Arc<dyn AttemptRepository>,
    applications: Arc<dyn ApplicationRepository>,
    handoff: Arc<ResultHandoff>,
}

impl ResultPublisher {
    #[must_use]
    pub fn new(
        clock: Clock,
        attempts: Arc<dyn AttemptRepository>,
        applications: Arc<dyn ApplicationRepository>,
        handoff: Arc<ResultHandoff>,
    ) -> Self {
        Self {
            clock,
            attempts,
            applications,
            handoff,
        }
    }

    pub async fn publish(&self, user_id: UserId, score: Score) -> PublishReceipt {
        let now = self.clock.now();

        let attempt_saved = self.save_attempt(user_id, score, now).await;
        let application = self.attach_to_application(user_id, score, now).await;

        let mut result = ExamResult::new(score, now);
        if let ApplicationWrite::Attached(id) = application {
            result = result.with_application(id);
        }
        self.handoff.stage(result.clone());

        info!(
            %user_id,
            percentage = score.percentage,
            passed = result.passed,
            attempt_saved,
            ?application,
            "exam result published"
        );

        PublishReceipt {
            result,
            attempt_saved,
            application,
        }
    }

    async fn save_attempt(&self, user_id: UserId, score: Score, now: DateTime<Utc>) -> bool {
        let attempt = Attempt::new(user_id, now, score);
        match self.attempts.put_attempt(&attempt).await {
            Ok(()) => true,
            Err(err) => {
                error!(%user_id, error = %err, "failed to save attempt record");
                false
            }
        }
    }

    async fn attach_to_application(
        &self,
        user_id: UserId,
        score: Score,
        now: DateTime<Utc>,
    ) -> ApplicationWrite {
        let application = match self.applications.find_active_application(user_id).await {
            Ok(Some(application)) => application,
            Ok(None) => return ApplicationWrite::Skipped,
            Err(err) => {
                error!(%user_id, error = %err, "failed to look up active application");
                return ApplicationWrite::Failed;
            }
        };

        let outcome = ExamOutcome::from_score(score, now);
        match self.applications.attach_exam(application.id, &outcome).await {
            Ok(()) => ApplicationWrite::Attached(application.id),
            Err(err) => {
                error!(
                    %user_id,
                    application_id = %application.id,
                    error = %err,
                    "failed to attach exam to application"
                );
                ApplicationWrite::Failed
            }
        }
    }
}
