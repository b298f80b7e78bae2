use async_trait::async_trait;
use exam_core::model::{ApplicationId, ApplicationRecord, ExamOutcome, UserId, first_active};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_application_row, outcome_to_json};
use crate::repository::{ApplicationRepository, StorageError};

#[async_trait]
impl ApplicationRepository for SqliteRepository {
    async fn upsert_application(&self, record: &ApplicationRecord) -> Result<(), StorageError> {
        let exam = record.exam.as_ref().map(outcome_to_json).transpose()?;
        sqlx::query(
            r"
                INSERT INTO applications (id, user_id, status, created_at, exam)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    status = excluded.status,
                    created_at = excluded.created_at,
                    exam = excluded.exam
            ",
        )
        .bind(id_i64("application_id", record.id.value())?)
        .bind(id_i64("user_id", record.user_id.value())?)
        .bind(&record.status)
        .bind(record.created_at)
        .bind(exam)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_application(&self, id: ApplicationId) -> Result<ApplicationRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, status, created_at, exam
                FROM applications
                WHERE id = ?1
            ",
        )
        .bind(id_i64("application_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_application_row(&row)
    }

    async fn find_active_application(
        &self,
        user_id: UserId,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, status, created_at, exam
                FROM applications
                WHERE user_id = ?1
                ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        // Status matching stays in Rust so every store applies the same rule.
        let records = rows
            .iter()
            .map(map_application_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(first_active(&records).cloned())
    }

    async fn attach_exam(
        &self,
        id: ApplicationId,
        outcome: &ExamOutcome,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE applications SET exam = ?1 WHERE id = ?2")
            .bind(outcome_to_json(outcome)?)
            .bind(id_i64("application_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
