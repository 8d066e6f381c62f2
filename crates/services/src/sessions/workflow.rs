use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::model::{QuizId, ResultRecord};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::documents::DocumentSource;
use storage::repository::ResultStore;
use tracing::info;

use super::service::QuizSession;
use crate::catalog::fetch_quiz;
use crate::error::SessionError;

/// Orchestrates quiz start and persisted completion.
#[derive(Clone)]
pub struct SessionLoopService {
    documents: Arc<dyn DocumentSource>,
    results: Arc<dyn ResultStore>,
    rng: Arc<Mutex<StdRng>>,
    shuffle: bool,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentSource>, results: Arc<dyn ResultStore>) -> Self {
        Self {
            documents,
            results,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
            shuffle: true,
        }
    }

    /// Seed the question shuffler so question order is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Enable or disable shuffling; disabled sessions follow document order.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Load `quiz_id` and start a fresh session over it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Catalog` if the quiz cannot be loaded and
    /// `SessionError::EmptyQuiz` if it has no questions.
    pub async fn start_session(&self, quiz_id: &QuizId) -> Result<QuizSession, SessionError> {
        let questions = fetch_quiz(self.documents.as_ref(), quiz_id).await?;
        if !self.shuffle {
            return QuizSession::start_in_order(quiz_id.clone(), questions);
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        QuizSession::start(quiz_id.clone(), questions, &mut *rng)
    }

    /// Build the completed session's result and save it as the quiz's latest result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while questions remain, or
    /// `SessionError::Storage` if the result cannot be saved.
    pub async fn finish(&self, session: &QuizSession) -> Result<ResultRecord, SessionError> {
        let record = session.build_result()?;
        self.results.save_result(session.quiz_id(), &record).await?;
        info!(
            quiz = %session.quiz_id(),
            score = record.score(),
            total = record.total_questions(),
            incorrect = record.incorrect(),
            "quiz result saved"
        );
        Ok(record)
    }

    /// The last saved result for `quiz_id`, if it was ever completed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the stored value cannot be read.
    pub async fn last_result(&self, quiz_id: &QuizId) -> Result<Option<ResultRecord>, SessionError> {
        Ok(self.results.load_result(quiz_id).await?)
    }
}
