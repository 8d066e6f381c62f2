use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuizId;

/// Prefix of the key-value storage key a quiz's last result is saved under.
pub const RESULT_KEY_PREFIX: &str = "quizResults_";

/// Storage key for the last result of `quiz_id`.
#[must_use]
pub fn result_storage_key(quiz_id: &QuizId) -> String {
    format!("{RESULT_KEY_PREFIX}{}", quiz_id.as_str())
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultRecordError {
    #[error("score ({score}) exceeds total questions ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// One wrong submission, kept for the end-of-quiz review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeEntry {
    pub question: String,
    pub selected_answer: String,
    pub correct_answer: String,
}

/// Summary of one completed attempt at one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    score: u32,
    total_questions: u32,
    correct: u32,
    incorrect: u32,
    details: Vec<MistakeEntry>,
}

impl ResultRecord {
    /// Rehydrate a result from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ResultRecordError::ScoreExceedsTotal` if the score is larger than
    /// the number of questions.
    pub fn from_persisted(
        score: u32,
        total_questions: u32,
        correct: u32,
        incorrect: u32,
        details: Vec<MistakeEntry>,
    ) -> Result<Self, ResultRecordError> {
        if score > total_questions {
            return Err(ResultRecordError::ScoreExceedsTotal {
                score,
                total: total_questions,
            });
        }
        Ok(Self {
            score,
            total_questions,
            correct,
            incorrect,
            details,
        })
    }

    /// Re-run the persisted-shape checks on a record that came through serde.
    ///
    /// # Errors
    ///
    /// Same as [`ResultRecord::from_persisted`].
    pub fn validated(self) -> Result<Self, ResultRecordError> {
        Self::from_persisted(
            self.score,
            self.total_questions,
            self.correct,
            self.incorrect,
            self.details,
        )
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn details(&self) -> &[MistakeEntry] {
        &self.details
    }

    /// `"score/total"` label shown next to a quiz in listings.
    #[must_use]
    pub fn score_summary(&self) -> String {
        format!("{}/{}", self.score, self.total_questions)
    }
}
