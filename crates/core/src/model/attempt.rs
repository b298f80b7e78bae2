use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;
use crate::scorer::PASS_PERCENTAGE;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("percentage out of range: {0}")]
    PercentageOutOfRange(f64),
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Outcome of scoring one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    /// Rounded to one decimal place.
    pub percentage: f64,
}

impl Score {
    /// Builds a score from raw counts, rounding the percentage to one decimal.
    ///
    /// An empty exam scores `0.0`.
    #[must_use]
    pub fn from_counts(correct: u32, total: u32) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            round_one_decimal(f64::from(correct) / f64::from(total) * 100.0)
        };
        Self {
            correct,
            total,
            percentage,
        }
    }

    /// Rehydrate a score read back from storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if the stored values are inconsistent.
    pub fn from_persisted(correct: u32, total: u32, percentage: f64) -> Result<Self, AttemptError> {
        if correct > total {
            return Err(AttemptError::CorrectExceedsTotal { correct, total });
        }
        if !(0.0..=100.0).contains(&percentage) {
            return Err(AttemptError::PercentageOutOfRange(percentage));
        }
        Ok(Self {
            correct,
            total,
            percentage,
        })
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.percentage >= PASS_PERCENTAGE
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// The most recent completed attempt of a user.
///
/// Never mutated; a later attempt replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    user_id: UserId,
    completed_at: DateTime<Utc>,
    score: Score,
}

impl Attempt {
    #[must_use]
    pub fn new(user_id: UserId, completed_at: DateTime<Utc>, score: Score) -> Self {
        Self {
            user_id,
            completed_at,
            score,
        }
    }

    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if the stored score is inconsistent.
    pub fn from_persisted(
        user_id: UserId,
        completed_at: DateTime<Utc>,
        correct: u32,
        total: u32,
        percentage: f64,
    ) -> Result<Self, AttemptError> {
        let score = Score::from_persisted(correct, total, percentage)?;
        Ok(Self::new(user_id, completed_at, score))
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }
}
