use chrono::{DateTime, Utc};
use exam_core::model::{ApplicationId, ApplicationRecord, Attempt, ExamOutcome, UserId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    Ok(UserId::new(i64_to_u64("user_id", v)?))
}

pub(crate) fn application_id_from_i64(v: i64) -> Result<ApplicationId, StorageError> {
    Ok(ApplicationId::new(i64_to_u64("application_id", v)?))
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<Attempt, StorageError> {
    let user_id = user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?;
    let completed_at: DateTime<Utc> = row.try_get("completed_at").map_err(ser)?;
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let percentage: f64 = row.try_get("percentage").map_err(ser)?;

    Attempt::from_persisted(user_id, completed_at, correct, total, percentage).map_err(ser)
}

pub(crate) fn map_application_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ApplicationRecord, StorageError> {
    let id = application_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let user_id = user_id_from_i64(row.try_get::<i64, _>("user_id").map_err(ser)?)?;
    let status: String = row.try_get("status").map_err(ser)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    let exam = row
        .try_get::<Option<String>, _>("exam")
        .map_err(ser)?
        .map(|raw| serde_json::from_str::<ExamOutcome>(&raw))
        .transpose()
        .map_err(ser)?;

    Ok(ApplicationRecord {
        id,
        user_id,
        status,
        created_at,
        exam,
    })
}

pub(crate) fn outcome_to_json(outcome: &ExamOutcome) -> Result<String, StorageError> {
    serde_json::to_string(outcome).map_err(ser)
}
