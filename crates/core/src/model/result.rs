use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::attempt::Score;
use crate::model::ids::ApplicationId;
use crate::scorer::{MAX_SCORE, PASS_PERCENTAGE};

/// Result handed to the screen that follows a finished exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub percentage: f64,
    pub passed: bool,
    pub correct: u32,
    pub total: u32,
    pub date_taken: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
}

impl ExamResult {
    #[must_use]
    pub fn new(score: Score, date_taken: DateTime<Utc>) -> Self {
        Self {
            percentage: score.percentage,
            passed: score.passed(),
            correct: score.correct,
            total: score.total,
            date_taken,
            application_id: None,
        }
    }

    #[must_use]
    pub fn with_application(mut self, id: ApplicationId) -> Self {
        self.application_id = Some(id);
        self
    }
}

/// Exam outcome embedded in an application record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamOutcome {
    pub taken: bool,
    pub score: f64,
    pub passed: bool,
    pub date_taken: DateTime<Utc>,
    pub max_score: f64,
    pub passing_score: f64,
    pub details: Score,
}

impl ExamOutcome {
    #[must_use]
    pub fn from_score(score: Score, date_taken: DateTime<Utc>) -> Self {
        Self {
            taken: true,
            score: score.percentage,
            passed: score.passed(),
            date_taken,
            max_score: MAX_SCORE,
            passing_score: PASS_PERCENTAGE,
            details: score,
        }
    }
}
