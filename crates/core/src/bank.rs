//! Loading the fixed question bank.
//!
//! The bank is a JSON document of the form
//!
//! ```json
//! { "questions": [ { "text": "...", "options": [ { "text": "...", "correct": true } ] } ] }
//! ```
//!
//! It is static configuration: loaded once, validated as a whole, never
//! partially accepted.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use thiserror::Error;

use crate::model::{AnswerOption, Question, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed question bank: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("malformed question bank: question {number}: {source}")]
    MalformedQuestion {
        /// 1-based position in the document.
        number: usize,
        #[source]
        source: QuestionError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BankDocument {
    questions: Vec<QuestionDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionDocument {
    text: String,
    options: Vec<AnswerOption>,
}

/// Ordered, validated list of exam questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

static LOADED: OnceLock<Arc<QuestionBank>> = OnceLock::new();

impl QuestionBank {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Parse a bank from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `BankError::MalformedDocument` for invalid JSON and
    /// `BankError::MalformedQuestion` for the first question that breaks the
    /// option invariants.
    pub fn from_json_str(raw: &str) -> Result<Self, BankError> {
        let doc: BankDocument = serde_json::from_str(raw)?;
        let questions = doc
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| {
                Question::new(q.text, q.options).map_err(|source| BankError::MalformedQuestion {
                    number: i + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { questions })
    }

    /// Read and parse a bank file.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Io` if the file cannot be read, otherwise the
    /// errors of [`QuestionBank::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, BankError> {
        let raw = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load the process-wide bank, reading `path` only on the first successful call.
    ///
    /// Later calls return the cached bank whatever path they pass.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the first load fails; nothing is cached then.
    pub fn load_once(path: &Path) -> Result<Arc<Self>, BankError> {
        if let Some(bank) = LOADED.get() {
            return Ok(Arc::clone(bank));
        }
        let bank = Arc::new(Self::from_path(path)?);
        // A concurrent first load may have won; keep whichever landed.
        Ok(Arc::clone(LOADED.get_or_init(|| bank)))
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}
