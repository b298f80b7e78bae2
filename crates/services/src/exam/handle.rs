use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use exam_core::model::UserId;
use exam_core::{EndReason, ExamSession, Navigation, Tick};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use super::view::ExamView;
use crate::error::ExamError;
use crate::publisher::{PublishReceipt, ResultPublisher};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// How and with what result an exam ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamCompletion {
    pub reason: EndReason,
    pub receipt: PublishReceipt,
}

/// Result of moving forward.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved(usize),
    /// Moving past the last question submitted the exam.
    Finished(ExamCompletion),
}

struct ActiveExam {
    user_id: UserId,
    session: ExamSession,
    publisher: Arc<ResultPublisher>,
    finished: watch::Sender<Option<ExamCompletion>>,
}

impl ActiveExam {
    /// Score and publish. Called exactly once, right after the session ended.
    async fn finish(&mut self) -> ExamCompletion {
        let reason = self.session.end_reason().unwrap_or(EndReason::Submitted);
        let score = self.session.score();
        let receipt = self.publisher.publish(self.user_id, score).await;
        let completion = ExamCompletion { reason, receipt };
        self.finished.send_replace(Some(completion.clone()));
        completion
    }
}

/// Owner of one running attempt and its countdown task.
///
/// All session mutations go through one mutex, so the countdown and the
/// user's actions never interleave inside the state machine. Dropping the
/// handle abandons the attempt: the countdown stops and nothing is published,
/// unless time already ran out, in which case the save still completes.
pub struct ExamHandle {
    user_id: UserId,
    shared: Arc<Mutex<ActiveExam>>,
    countdown: JoinHandle<()>,
    finished: watch::Receiver<Option<ExamCompletion>>,
}

impl ExamHandle {
    /// Take ownership of a started session and begin its countdown.
    ///
    /// Must be called within a tokio runtime.
    pub(crate) fn spawn(
        user_id: UserId,
        session: ExamSession,
        publisher: Arc<ResultPublisher>,
    ) -> Self {
        let (tx, rx) = watch::channel(None);
        let shared = Arc::new(Mutex::new(ActiveExam {
            user_id,
            session,
            publisher,
            finished: tx,
        }));
        let countdown = tokio::spawn(run_countdown(Arc::clone(&shared)));
        Self {
            user_id,
            shared,
            countdown,
            finished: rx,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Current state for rendering.
    pub async fn snapshot(&self) -> ExamView {
        let exam = self.shared.lock().await;
        ExamView::from_session(&exam.session)
    }

    /// # Errors
    ///
    /// Returns `ExamError::Session` if the exam is over or the option does not exist.
    pub async fn select_answer(&self, option: usize) -> Result<(), ExamError> {
        let mut exam = self.shared.lock().await;
        exam.session.select_answer(option)?;
        Ok(())
    }

    /// Move back one question, staying on the first. Returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Session` if the exam is over.
    pub async fn go_to_previous(&self) -> Result<usize, ExamError> {
        let mut exam = self.shared.lock().await;
        Ok(exam.session.go_to_previous()?)
    }

    /// Move to the next question, submitting from the last one.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Session` if the exam is over.
    pub async fn go_to_next(&self) -> Result<Advance, ExamError> {
        let mut exam = self.shared.lock().await;
        match exam.session.go_to_next()? {
            Navigation::Moved(index) => Ok(Advance::Moved(index)),
            Navigation::Submitted => {
                self.countdown.abort();
                info!(user_id = %self.user_id, "exam submitted from last question");
                Ok(Advance::Finished(exam.finish().await))
            }
        }
    }

    /// Submit the exam now.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Session` if the exam already ended.
    pub async fn submit(&self) -> Result<ExamCompletion, ExamError> {
        let mut exam = self.shared.lock().await;
        exam.session.submit()?;
        self.countdown.abort();
        info!(user_id = %self.user_id, "exam submitted");
        Ok(exam.finish().await)
    }

    /// The completion, if the exam has ended.
    #[must_use]
    pub fn completion(&self) -> Option<ExamCompletion> {
        self.finished.borrow().clone()
    }

    /// Wait until the exam ends by submission or timeout.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Abandoned` if the exam can no longer finish.
    pub async fn wait_finished(&self) -> Result<ExamCompletion, ExamError> {
        let mut rx = self.finished.clone();
        let done = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| ExamError::Abandoned)?;
        (*done).clone().ok_or(ExamError::Abandoned)
    }

    /// Give up on the attempt without recording anything.
    ///
    /// An attempt that already timed out is still saved.
    pub fn abandon(self) {
        info!(user_id = %self.user_id, "exam abandoned");
    }
}

impl Drop for ExamHandle {
    fn drop(&mut self) {
        self.countdown.abort();
    }
}

impl fmt::Debug for ExamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamHandle")
            .field("user_id", &self.user_id)
            .field("finished", &self.finished.borrow().is_some())
            .finish_non_exhaustive()
    }
}

async fn run_countdown(shared: Arc<Mutex<ActiveExam>>) {
    let mut ticker = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    loop {
        ticker.tick().await;
        let mut exam = Arc::clone(&shared).lock_owned().await;
        match exam.session.tick() {
            Ok(Tick::Running { remaining }) => debug!(remaining, "exam tick"),
            Ok(Tick::Expired) => {
                info!(user_id = %exam.user_id, "exam time expired, submitting");
                // Runs detached: the save outlives an abandoned handle.
                tokio::spawn(async move {
                    exam.finish().await;
                });
                return;
            }
            // Ended by the user between two ticks.
            Err(_) => return,
        }
    }
}
