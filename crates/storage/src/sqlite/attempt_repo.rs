use async_trait::async_trait;
use exam_core::model::{Attempt, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_attempt_row};
use crate::repository::{AttemptRepository, StorageError};

#[async_trait]
impl AttemptRepository for SqliteRepository {
    async fn get_attempt(&self, user_id: UserId) -> Result<Option<Attempt>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT user_id, completed_at, correct, total, percentage
                FROM exam_attempts
                WHERE user_id = ?1
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_attempt_row).transpose()
    }

    async fn put_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        let score = attempt.score();
        sqlx::query(
            r"
                INSERT INTO exam_attempts (user_id, completed_at, correct, total, percentage)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id) DO UPDATE SET
                    completed_at = excluded.completed_at,
                    correct = excluded.correct,
                    total = excluded.total,
                    percentage = excluded.percentage
            ",
        )
        .bind(id_i64("user_id", attempt.user_id().value())?)
        .bind(attempt.completed_at())
        .bind(i64::from(score.correct))
        .bind(i64::from(score.total))
        .bind(score.percentage)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
