//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionKind, QuestionNumber, QuizId, ResultRecordError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizCatalog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("quiz manifest unavailable at {location}: {reason}")]
    ManifestUnavailable { location: String, reason: String },
    #[error("quiz manifest has not been loaded")]
    ManifestNotLoaded,
    #[error("failed to load quiz {quiz_id}: {reason}")]
    QuizLoad { quiz_id: QuizId, reason: String },
}

/// Why an answer submission was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("session already completed")]
    SessionCompleted,
    #[error("question {submitted} is not the current question ({current})")]
    NotCurrent {
        current: QuestionNumber,
        submitted: QuestionNumber,
    },
    #[error("question {number} is {actual:?}, not {expected:?}")]
    WrongKind {
        number: QuestionNumber,
        expected: QuestionKind,
        actual: QuestionKind,
    },
    #[error("answer index {index} out of range for {len} answers")]
    AnswerOutOfRange { index: usize, len: usize },
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz has no questions")]
    EmptyQuiz,
    #[error("invalid submission: {0}")]
    InvalidSubmission(#[from] SubmissionError),
    #[error("session is not completed yet")]
    NotCompleted,
    #[error("a newer quiz load superseded this one")]
    StaleLoad,
    #[error(transparent)]
    Record(#[from] ResultRecordError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
