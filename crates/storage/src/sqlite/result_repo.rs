use chrono::{DateTime, Utc};
use quiz_core::model::{QuizId, ResultRecord, result_storage_key};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{ResultStore, StorageError, decode_record, encode_record};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

impl SqliteRepository {
    /// When the stored result for `quiz_id` was last written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` for query failures.
    pub async fn result_saved_at(
        &self,
        quiz_id: &QuizId,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        let row = sqlx::query("SELECT saved_at FROM quiz_results WHERE storage_key = ?1")
            .bind(result_storage_key(quiz_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| r.try_get::<DateTime<Utc>, _>("saved_at").map_err(ser))
            .transpose()
    }
}

#[async_trait::async_trait]
impl ResultStore for SqliteRepository {
    async fn save_result(
        &self,
        quiz_id: &QuizId,
        record: &ResultRecord,
    ) -> Result<(), StorageError> {
        let payload = encode_record(record)?;

        sqlx::query(
            r"
                INSERT INTO quiz_results (storage_key, quiz_id, payload, saved_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(storage_key) DO UPDATE SET
                    payload = excluded.payload,
                    saved_at = excluded.saved_at
            ",
        )
        .bind(result_storage_key(quiz_id))
        .bind(quiz_id.as_str())
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn load_result(&self, quiz_id: &QuizId) -> Result<Option<ResultRecord>, StorageError> {
        let row = sqlx::query("SELECT payload FROM quiz_results WHERE storage_key = ?1")
            .bind(result_storage_key(quiz_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload").map_err(ser)?;
        decode_record(&payload).map(Some)
    }
}
