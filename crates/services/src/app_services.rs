use std::sync::Arc;

use exam_core::QuestionBank;
use storage::repository::Storage;

use crate::Clock;
use crate::cooldown_gate::CooldownGate;
use crate::error::AppServicesError;
use crate::exam::ExamRunner;
use crate::handoff::ResultHandoff;
use crate::identity::Identity;
use crate::publisher::ResultPublisher;

/// Assembles exam-facing services over one storage backend.
#[derive(Clone)]
pub struct ExamServices {
    runner: Arc<ExamRunner>,
    handoff: Arc<ResultHandoff>,
}

impl ExamServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        bank: Arc<QuestionBank>,
        identity: Arc<dyn Identity>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, bank, identity))
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        bank: Arc<QuestionBank>,
        identity: Arc<dyn Identity>,
    ) -> Self {
        let handoff = Arc::new(ResultHandoff::new());
        let gate = Arc::new(CooldownGate::new(clock, Arc::clone(&storage.attempts)));
        let publisher = Arc::new(ResultPublisher::new(
            clock,
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.applications),
            Arc::clone(&handoff),
        ));
        let runner = Arc::new(ExamRunner::new(bank, identity, gate, publisher));

        Self { runner, handoff }
    }

    #[must_use]
    pub fn runner(&self) -> Arc<ExamRunner> {
        Arc::clone(&self.runner)
    }

    #[must_use]
    pub fn handoff(&self) -> Arc<ResultHandoff> {
        Arc::clone(&self.handoff)
    }
}
