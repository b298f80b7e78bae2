use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("option {index} text cannot be empty")]
    EmptyOptionText { index: usize },

    #[error("a question needs at least 2 options, found {found}")]
    TooFewOptions { found: usize },

    #[error("a question needs exactly one correct option, found {found}")]
    CorrectOptionCount { found: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One labeled choice of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

impl AnswerOption {
    #[must_use]
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

/// A single multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<AnswerOption>,
    correct_index: usize,
}

impl Question {
    /// Builds a question, enforcing the option invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, there are fewer than two
    /// options, an option is blank, or the number of correct options is not one.
    pub fn new(
        text: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                found: options.len(),
            });
        }
        if let Some(index) = options.iter().position(|o| o.text.trim().is_empty()) {
            return Err(QuestionError::EmptyOptionText { index });
        }

        let mut correct = options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.correct)
            .map(|(i, _)| i);
        let correct_index = match (correct.next(), correct.next()) {
            (Some(index), None) => index,
            (None, _) => return Err(QuestionError::CorrectOptionCount { found: 0 }),
            (Some(_), Some(_)) => {
                let found = options.iter().filter(|o| o.correct).count();
                return Err(QuestionError::CorrectOptionCount { found });
            }
        };

        Ok(Self {
            text,
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Index of the single option marked correct.
    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index
    }
}
