use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ApplicationId, UserId};
use crate::model::result::ExamOutcome;

const CANCELLED: &str = "cancelled";
const REJECTED: &str = "rejected";

/// An application record owned by the surrounding system.
///
/// The exam only reads its status and attaches an `ExamOutcome`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub exam: Option<ExamOutcome>,
}

impl ApplicationRecord {
    #[must_use]
    pub fn new(
        id: ApplicationId,
        user_id: UserId,
        status: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            status: status.into(),
            created_at,
            exam: None,
        }
    }

    /// Returns true unless the application was cancelled or rejected.
    #[must_use]
    pub fn is_active(&self) -> bool {
        is_active_status(&self.status)
    }
}

/// Status rule shared by every application store.
///
/// Any status mentioning "rejected" (e.g. "rejected_by_admin") counts as inactive.
#[must_use]
pub fn is_active_status(status: &str) -> bool {
    let status = status.trim().to_ascii_lowercase();
    status != CANCELLED && !status.contains(REJECTED)
}

/// Picks the first active application in store order.
pub fn first_active<'a, I>(records: I) -> Option<&'a ApplicationRecord>
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    records.into_iter().find(|r| r.is_active())
}
