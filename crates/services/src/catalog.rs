use std::sync::Arc;

use futures::future::join_all;
use quiz_core::document::{parse_manifest, parse_quiz};
use quiz_core::model::{Manifest, ManifestEntry, Question, QuizId};
use storage::documents::DocumentSource;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::search::SearchIndex;

/// Manifest location used when none is configured.
pub const DEFAULT_MANIFEST: &str = "quiz_manifest.json";

/// A question in the flattened search collection, tagged with the quiz it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuestion {
    pub category: String,
    pub quiz_name: String,
    pub quiz_id: QuizId,
    pub question: Question,
}

impl CatalogQuestion {
    fn tagged(entry: &ManifestEntry, question: Question) -> Self {
        Self {
            category: entry.category.clone(),
            quiz_name: entry.name.clone(),
            quiz_id: entry.path.clone(),
            question,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.question.text()
    }
}

/// A quiz whose questions could not be preloaded.
#[derive(Debug)]
pub struct PreloadFailure {
    pub quiz_id: QuizId,
    pub error: CatalogError,
}

/// Outcome of a best-effort preload: what loaded and what was skipped.
#[derive(Debug, Default)]
pub struct PreloadReport {
    pub loaded_quizzes: usize,
    pub questions: usize,
    pub failures: Vec<PreloadFailure>,
}

impl PreloadReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch and parse one quiz document.
///
/// # Errors
///
/// Returns `CatalogError::QuizLoad` if the document cannot be fetched or parsed.
pub async fn fetch_quiz(
    source: &dyn DocumentSource,
    quiz_id: &QuizId,
) -> Result<Vec<Question>, CatalogError> {
    let quiz_load = |reason: String| CatalogError::QuizLoad {
        quiz_id: quiz_id.clone(),
        reason,
    };
    let raw = source
        .fetch(quiz_id.as_str())
        .await
        .map_err(|e| quiz_load(e.to_string()))?;
    parse_quiz(&raw).map_err(|e| quiz_load(e.to_string()))
}

/// Manifest plus the flattened, search-ready collection of every quiz's questions.
pub struct QuizCatalog {
    source: Arc<dyn DocumentSource>,
    manifest_location: String,
    manifest: Option<Manifest>,
    questions: Vec<CatalogQuestion>,
}

impl QuizCatalog {
    #[must_use]
    pub fn new(source: Arc<dyn DocumentSource>, manifest_location: impl Into<String>) -> Self {
        Self {
            source,
            manifest_location: manifest_location.into(),
            manifest: None,
            questions: Vec::new(),
        }
    }

    #[must_use]
    pub fn source(&self) -> Arc<dyn DocumentSource> {
        Arc::clone(&self.source)
    }

    #[must_use]
    pub fn manifest_location(&self) -> &str {
        &self.manifest_location
    }

    /// Fetch and parse the manifest.
    ///
    /// On failure the catalog is left empty.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ManifestUnavailable` if retrieval or parsing fails.
    pub async fn load_manifest(&mut self) -> Result<&Manifest, CatalogError> {
        let loaded = match self.source.fetch(&self.manifest_location).await {
            Ok(raw) => parse_manifest(&raw).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match loaded {
            Ok(manifest) => {
                info!(
                    location = %self.manifest_location,
                    quizzes = manifest.len(),
                    "quiz manifest loaded"
                );
                Ok(&*self.manifest.insert(manifest))
            }
            Err(reason) => {
                self.manifest = None;
                self.questions.clear();
                Err(CatalogError::ManifestUnavailable {
                    location: self.manifest_location.clone(),
                    reason,
                })
            }
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::ManifestNotLoaded` until `load_manifest` succeeds.
    pub fn manifest(&self) -> Result<&Manifest, CatalogError> {
        self.manifest.as_ref().ok_or(CatalogError::ManifestNotLoaded)
    }

    /// Distinct categories in manifest order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ManifestNotLoaded` until `load_manifest` succeeds.
    pub fn categories(&self) -> Result<Vec<&str>, CatalogError> {
        Ok(self.manifest()?.categories())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::ManifestNotLoaded` until `load_manifest` succeeds.
    pub fn quizzes_in(&self, category: &str) -> Result<Vec<&ManifestEntry>, CatalogError> {
        Ok(self.manifest()?.quizzes_in(category))
    }

    /// The manifest entry listing `quiz_id`; `None` before a manifest is loaded.
    #[must_use]
    pub fn entry(&self, quiz_id: &QuizId) -> Option<&ManifestEntry> {
        self.manifest.as_ref()?.entry(quiz_id)
    }

    /// Load every manifest quiz concurrently into the flattened collection.
    ///
    /// Each quiz succeeds or fails on its own; failures are logged, reported, and
    /// leave that quiz's questions out. The previous collection is replaced.
    pub async fn preload_all(&mut self) -> PreloadReport {
        let entries: Vec<ManifestEntry> = self
            .manifest
            .as_ref()
            .map(|m| m.entries().to_vec())
            .unwrap_or_default();

        if entries.is_empty() {
            debug!("no manifest entries to preload");
        }

        let futures: Vec<_> = entries
            .iter()
            .map(|entry| {
                let source = Arc::clone(&self.source);
                async move {
                    let result = fetch_quiz(source.as_ref(), &entry.path).await;
                    (entry, result)
                }
            })
            .collect();

        let results = join_all(futures).await;

        let mut questions = Vec::new();
        let mut report = PreloadReport::default();
        for (entry, result) in results {
            match result {
                Ok(loaded) => {
                    debug!(quiz = %entry.path, questions = loaded.len(), "quiz preloaded");
                    report.loaded_quizzes += 1;
                    questions.extend(loaded.into_iter().map(|q| CatalogQuestion::tagged(entry, q)));
                }
                Err(error) => {
                    warn!(quiz = %entry.path, %error, "skipping quiz during preload");
                    report.failures.push(PreloadFailure {
                        quiz_id: entry.path.clone(),
                        error,
                    });
                }
            }
        }

        report.questions = questions.len();
        self.questions = questions;
        info!(
            loaded = report.loaded_quizzes,
            failed = report.failures.len(),
            questions = report.questions,
            "quiz preload finished"
        );
        report
    }

    /// The flattened collection; empty until `preload_all` resolves.
    #[must_use]
    pub fn flattened_questions(&self) -> &[CatalogQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn search_index(&self) -> SearchIndex<'_> {
        SearchIndex::new(&self.questions)
    }

    /// Fetch one quiz's questions for an explicit start.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::QuizLoad` if the document cannot be fetched or parsed.
    pub async fn load_quiz(&self, quiz_id: &QuizId) -> Result<Vec<Question>, CatalogError> {
        fetch_quiz(self.source.as_ref(), quiz_id).await
    }
}
