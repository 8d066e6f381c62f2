use async_trait::async_trait;
use quiz_core::model::{QuizId, ResultRecord, result_storage_key};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub(crate) fn encode_record(record: &ResultRecord) -> Result<String, StorageError> {
    serde_json::to_string(record).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn decode_record(raw: &str) -> Result<ResultRecord, StorageError> {
    let record: ResultRecord =
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
    record
        .validated()
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Repository contract for the last result of each quiz.
///
/// Values are stored as JSON under `quizResults_<path>`; one record per quiz.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist `record` as the latest result for `quiz_id`, replacing any prior one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_result(&self, quiz_id: &QuizId, record: &ResultRecord)
    -> Result<(), StorageError>;

    /// Fetch the latest result for `quiz_id`, or `None` when the quiz was never completed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored value cannot be read or decoded.
    async fn load_result(&self, quiz_id: &QuizId) -> Result<Option<ResultRecord>, StorageError>;
}

/// Simple in-memory key/value repository for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Raw stored value for a key, as a browser's local storage would return it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

#[async_trait]
impl ResultStore for InMemoryRepository {
    async fn save_result(
        &self,
        quiz_id: &QuizId,
        record: &ResultRecord,
    ) -> Result<(), StorageError> {
        let value = encode_record(record)?;
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(result_storage_key(quiz_id), value);
        Ok(())
    }

    async fn load_result(&self, quiz_id: &QuizId) -> Result<Option<ResultRecord>, StorageError> {
        let raw = self.raw_value(&result_storage_key(quiz_id))?;
        raw.as_deref().map(decode_record).transpose()
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn ResultStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let results: Arc<dyn ResultStore> = Arc::new(InMemoryRepository::new());
        Self { results }
    }
}
