use std::sync::Arc;

use exam_core::cooldown::{CooldownLock, Eligibility};
use exam_core::model::UserId;
use exam_core::{ExamSession, QuestionBank};
use tracing::info;

use super::handle::ExamHandle;
use crate::cooldown_gate::CooldownGate;
use crate::error::ExamError;
use crate::identity::{Identity, Role};
use crate::publisher::ResultPublisher;

/// Role a user must hold to sit the exam.
pub const REQUIRED_ROLE: Role = Role::Candidate;

/// Outcome of asking to begin an exam.
#[derive(Debug)]
pub enum ExamStart {
    Started(ExamHandle),
    /// Rendered in place; the user stays on the exam screen.
    Locked(CooldownLock),
}

/// Orchestrates identity check, cooldown gate and session start.
#[derive(Clone)]
pub struct ExamRunner {
    bank: Arc<QuestionBank>,
    identity: Arc<dyn Identity>,
    gate: Arc<CooldownGate>,
    publisher: Arc<ResultPublisher>,
}

impl ExamRunner {
    #[must_use]
    pub fn new(
        bank: Arc<QuestionBank>,
        identity: Arc<dyn Identity>,
        gate: Arc<CooldownGate>,
        publisher: Arc<ResultPublisher>,
    ) -> Self {
        Self {
            bank,
            identity,
            gate,
            publisher,
        }
    }

    /// The signed-in candidate.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::IdentityMissing` if nobody is signed in or the user
    /// is not a candidate.
    pub fn current_candidate(&self) -> Result<UserId, ExamError> {
        let user_id = self
            .identity
            .current_user_id()
            .ok_or(ExamError::IdentityMissing)?;
        if !self.identity.is_authenticated(REQUIRED_ROLE) {
            return Err(ExamError::IdentityMissing);
        }
        Ok(user_id)
    }

    /// Cooldown eligibility of the signed-in candidate.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::IdentityMissing` without a signed-in candidate.
    pub async fn eligibility(&self) -> Result<(UserId, Eligibility), ExamError> {
        let user_id = self.current_candidate()?;
        Ok((user_id, self.gate.can_start(user_id).await))
    }

    /// Begin an attempt for the signed-in candidate.
    ///
    /// Must be called within a tokio runtime; the countdown starts immediately.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::IdentityMissing` without a signed-in candidate and
    /// `ExamError::Session` if the question bank is empty.
    pub async fn begin(&self) -> Result<ExamStart, ExamError> {
        let (user_id, eligibility) = self.eligibility().await?;
        if let Eligibility::Locked(lock) = eligibility {
            info!(%user_id, retry_at = %lock.retry_at, "exam locked by cooldown");
            return Ok(ExamStart::Locked(lock));
        }

        let mut session = ExamSession::new(Arc::clone(&self.bank))?;
        session.start()?;
        info!(
            %user_id,
            questions = session.total_questions(),
            seconds = session.remaining_seconds(),
            "exam started"
        );

        Ok(ExamStart::Started(ExamHandle::spawn(
            user_id,
            session,
            Arc::clone(&self.publisher),
        )))
    }
}
