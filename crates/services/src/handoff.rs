use std::sync::{Mutex, PoisonError};

use exam_core::model::ExamResult;

/// Single-slot handoff of the latest result to the next screen.
///
/// Staging overwrites whatever is there; `take` empties the slot so a result
/// is consumed at most once.
#[derive(Debug, Default)]
pub struct ResultHandoff {
    slot: Mutex<Option<ExamResult>>,
}

impl ResultHandoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, result: ExamResult) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    #[must_use]
    pub fn take(&self) -> Option<ExamResult> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    #[must_use]
    pub fn peek(&self) -> Option<ExamResult> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
