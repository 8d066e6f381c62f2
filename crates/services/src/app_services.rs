use std::path::PathBuf;
use std::sync::Arc;

use storage::documents::{DocumentSource, FsDocumentSource, HttpDocumentSource};
use storage::repository::{ResultStore, Storage};

use crate::catalog::{DEFAULT_MANIFEST, QuizCatalog};
use crate::error::AppServicesError;
use crate::search::{DEFAULT_MIN_QUERY_LEN, SearchIndex};
use crate::sessions::SessionLoopService;

/// Where manifest and quiz documents are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRoot {
    Directory(PathBuf),
    Url(String),
}

impl DocumentRoot {
    /// `http://` and `https://` roots are fetched over HTTP; anything else is a directory.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_owned())
        } else {
            Self::Directory(PathBuf::from(raw))
        }
    }

    #[must_use]
    pub fn into_source(self) -> Arc<dyn DocumentSource> {
        match self {
            Self::Directory(dir) => Arc::new(FsDocumentSource::new(dir)),
            Self::Url(url) => Arc::new(HttpDocumentSource::new(url)),
        }
    }
}

/// Results database used when none is configured, relative to the working directory.
pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

/// Resolved runtime settings for the services layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: DocumentRoot,
    pub manifest: String,
    /// `None` keeps results in memory for the lifetime of the process.
    pub db_url: Option<String>,
    pub seed: Option<u64>,
    pub min_query_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: DocumentRoot::Directory(PathBuf::from(".")),
            manifest: DEFAULT_MANIFEST.to_owned(),
            db_url: Some(DEFAULT_DB_URL.to_owned()),
            seed: None,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

/// Assembles app-facing services from configuration.
pub struct AppServices {
    catalog: QuizCatalog,
    session_loop: Arc<SessionLoopService>,
    results: Arc<dyn ResultStore>,
    min_query_len: usize,
}

impl AppServices {
    /// Build services from `config`, opening `SQLite` storage when a database URL is set.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn build(config: &AppConfig) -> Result<Self, AppServicesError> {
        let storage = match &config.db_url {
            Some(url) => Storage::sqlite(url).await?,
            None => Storage::in_memory(),
        };
        Ok(Self::with_parts(config, config.root.clone().into_source(), storage))
    }

    /// Build services over an explicit document source and storage.
    #[must_use]
    pub fn with_parts(
        config: &AppConfig,
        documents: Arc<dyn DocumentSource>,
        storage: Storage,
    ) -> Self {
        let catalog = QuizCatalog::new(Arc::clone(&documents), config.manifest.clone());
        let mut session_loop = SessionLoopService::new(documents, Arc::clone(&storage.results));
        if let Some(seed) = config.seed {
            session_loop = session_loop.with_seed(seed);
        }

        Self {
            catalog,
            session_loop: Arc::new(session_loop),
            results: storage.results,
            min_query_len: config.min_query_len,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut QuizCatalog {
        &mut self.catalog
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<SessionLoopService> {
        Arc::clone(&self.session_loop)
    }

    #[must_use]
    pub fn results(&self) -> Arc<dyn ResultStore> {
        Arc::clone(&self.results)
    }

    /// Search over the catalog's preloaded questions with the configured minimum length.
    #[must_use]
    pub fn search_index(&self) -> SearchIndex<'_> {
        self.catalog.search_index().with_min_length(self.min_query_len)
    }
}
