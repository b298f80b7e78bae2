use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::bank::QuestionBank;
use crate::model::{Question, Score};
use crate::scorer;

/// Length of one attempt in seconds.
pub const EXAM_DURATION_SECS: u32 = 300;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for the exam")]
    Empty,

    #[error("exam already started")]
    AlreadyStarted,

    #[error("exam is not running")]
    NotRunning,

    #[error("option {option} out of range for question with {available} options")]
    OptionOutOfRange { option: usize, available: usize },
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    Running,
    Ended,
}

/// Why a session reached `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Submitted,
    TimedOut,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining: u32 },
    Expired,
}

/// Result of moving forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved(usize),
    /// `go_to_next` on the last question submitted the exam.
    Submitted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one live attempt: `NotStarted -> Running -> Ended`.
///
/// Time is driven from outside through [`ExamSession::tick`]; the session
/// itself never reads a clock and does not check the cooldown.
pub struct ExamSession {
    bank: Arc<QuestionBank>,
    current: usize,
    answers: Vec<Option<usize>>,
    remaining_secs: u32,
    phase: SessionPhase,
    end_reason: Option<EndReason>,
}

impl ExamSession {
    /// Create a session over the given bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the bank has no questions.
    pub fn new(bank: Arc<QuestionBank>) -> Result<Self, SessionError> {
        if bank.is_empty() {
            return Err(SessionError::Empty);
        }
        let len = bank.len();
        Ok(Self {
            bank,
            current: 0,
            answers: vec![None; len],
            remaining_secs: EXAM_DURATION_SECS,
            phase: SessionPhase::NotStarted,
            end_reason: None,
        })
    }

    /// Start the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` unless the session is `NotStarted`.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        self.current = 0;
        self.answers.iter_mut().for_each(|a| *a = None);
        self.remaining_secs = EXAM_DURATION_SECS;
        self.phase = SessionPhase::Running;
        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero ends the session with `EndReason::TimedOut`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside the `Running` phase.
    pub fn tick(&mut self) -> Result<Tick, SessionError> {
        self.ensure_running()?;
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.end(EndReason::TimedOut);
            return Ok(Tick::Expired);
        }
        Ok(Tick::Running {
            remaining: self.remaining_secs,
        })
    }

    /// Record `option` as the answer to the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside the `Running` phase and
    /// `SessionError::OptionOutOfRange` if the question has no such option.
    pub fn select_answer(&mut self, option: usize) -> Result<(), SessionError> {
        self.ensure_running()?;
        let available = self.current_question().option_count();
        if option >= available {
            return Err(SessionError::OptionOutOfRange { option, available });
        }
        self.answers[self.current] = Some(option);
        Ok(())
    }

    /// Move back one question and return the new index; the first question
    /// stays put.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside the `Running` phase.
    pub fn go_to_previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_running()?;
        self.current = self.current.saturating_sub(1);
        Ok(self.current)
    }

    /// Move forward, or submit when already on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside the `Running` phase.
    pub fn go_to_next(&mut self) -> Result<Navigation, SessionError> {
        self.ensure_running()?;
        if self.is_last_question() {
            self.end(EndReason::Submitted);
            return Ok(Navigation::Submitted);
        }
        self.current += 1;
        Ok(Navigation::Moved(self.current))
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` outside the `Running` phase.
    pub fn submit(&mut self) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.end(EndReason::Submitted);
        Ok(())
    }

    /// Score the answers as they stand.
    #[must_use]
    pub fn score(&self) -> Score {
        scorer::score(self.bank.questions(), &self.answers)
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.phase == SessionPhase::Ended
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current` stays within bounds and the bank is never empty.
        &self.bank.questions()[self.current]
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.bank.len()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.bank.len()
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.current]
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_secs
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Running {
            Ok(())
        } else {
            Err(SessionError::NotRunning)
        }
    }

    fn end(&mut self, reason: EndReason) {
        self.phase = SessionPhase::Ended;
        self.end_reason = Some(reason);
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("questions_len", &self.bank.len())
            .field("current", &self.current)
            .field("answered", &self.answered_count())
            .field("remaining_secs", &self.remaining_secs)
            .field("phase", &self.phase)
            .field("end_reason", &self.end_reason)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn bank(n: usize) -> Arc<QuestionBank> {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    format!("Q{i}"),
                    vec![
                        AnswerOption::new("right", true),
                        AnswerOption::new("wrong", false),
                        AnswerOption::new("also wrong", false),
                    ],
                )
                .unwrap()
            })
            .collect();
        Arc::new(QuestionBank::new(questions))
    }

    fn running(n: usize) -> ExamSession {
        let mut session = ExamSession::new(bank(n)).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn empty_bank_returns_error() {
        let err = ExamSession::new(Arc::new(QuestionBank::new(Vec::new()))).unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn start_initializes_running_state() {
        let mut session = ExamSession::new(bank(3)).unwrap();
        assert_eq!(session.phase(), SessionPhase::NotStarted);
        assert_eq!(session.select_answer(0), Err(SessionError::NotRunning));

        session.start().unwrap();
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.remaining_seconds(), EXAM_DURATION_SECS);
        assert_eq!(session.answers(), &[None, None, None]);
        assert_eq!(session.start(), Err(SessionError::AlreadyStarted));
    }

    #[test]
    fn exactly_300_ticks_until_expiry() {
        let mut session = running(2);
        for expected in (1..EXAM_DURATION_SECS).rev() {
            assert_eq!(session.tick(), Ok(Tick::Running { remaining: expected }));
        }
        assert_eq!(session.tick(), Ok(Tick::Expired));
        assert_eq!(session.remaining_seconds(), 0);
        assert_eq!(session.phase(), SessionPhase::Ended);
        assert_eq!(session.end_reason(), Some(EndReason::TimedOut));
        assert_eq!(session.tick(), Err(SessionError::NotRunning));
        assert_eq!(session.remaining_seconds(), 0);
    }

    #[test]
    fn navigation_is_clamped_and_keeps_clock() {
        let mut session = running(3);
        assert_eq!(session.go_to_previous(), Ok(0));
        assert_eq!(session.current_index(), 0);

        session.tick().unwrap();
        assert_eq!(session.go_to_next(), Ok(Navigation::Moved(1)));
        session.tick().unwrap();
        assert_eq!(session.go_to_previous(), Ok(0));
        assert_eq!(session.remaining_seconds(), EXAM_DURATION_SECS - 2);
    }

    #[test]
    fn next_on_last_question_submits() {
        let mut session = running(2);
        session.go_to_next().unwrap();
        assert!(session.is_last_question());
        assert_eq!(session.go_to_next(), Ok(Navigation::Submitted));
        assert_eq!(session.end_reason(), Some(EndReason::Submitted));
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.go_to_next(), Err(SessionError::NotRunning));
        assert_eq!(session.go_to_previous(), Err(SessionError::NotRunning));
    }

    #[test]
    fn reselecting_overwrites_and_bounds_are_checked() {
        let mut session = running(2);
        session.select_answer(1).unwrap();
        session.select_answer(0).unwrap();
        assert_eq!(session.current_answer(), Some(0));
        assert_eq!(
            session.select_answer(3),
            Err(SessionError::OptionOutOfRange {
                option: 3,
                available: 3
            })
        );
        assert_eq!(session.current_answer(), Some(0));
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn submit_ends_once() {
        let mut session = running(2);
        session.submit().unwrap();
        assert!(session.is_ended());
        assert_eq!(session.submit(), Err(SessionError::NotRunning));
        assert_eq!(session.select_answer(0), Err(SessionError::NotRunning));
    }

    #[test]
    fn score_matches_selected_answers() {
        let mut session = running(4);
        session.select_answer(0).unwrap();
        session.go_to_next().unwrap();
        session.select_answer(1).unwrap();
        session.go_to_next().unwrap();
        session.select_answer(0).unwrap();
        session.submit().unwrap();

        let first = session.score();
        assert_eq!(first.correct, 2);
        assert_eq!(first.total, 4);
        assert_eq!(first.percentage, 50.0);
        assert_eq!(session.score(), first);
    }

    #[test]
    fn timeout_without_answers_scores_zero() {
        let mut session = running(16);
        while session.tick().unwrap() != Tick::Expired {}
        let score = session.score();
        assert_eq!(score.correct, 0);
        assert_eq!(score.total, 16);
        assert_eq!(score.percentage, 0.0);
        assert!(!score.passed());
    }
}
