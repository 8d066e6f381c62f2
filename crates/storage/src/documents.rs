//! Retrieval of manifest and quiz documents by their opaque location.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by document sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("request for {location} failed with status {status}")]
    Status {
        location: String,
        status: reqwest::StatusCode,
    },
}

/// Fetches a document's text by location (a manifest name or a quiz path).
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `SourceError` if the document cannot be retrieved.
    async fn fetch(&self, location: &str) -> Result<String, SourceError>;
}

/// Reads documents from a directory on disk; locations are relative to `root`.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl DocumentSource for FsDocumentSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        let path = self.resolve(location);
        tracing::debug!(path = %path.display(), "reading document");
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(location.to_owned())
            } else {
                SourceError::Io {
                    location: location.to_owned(),
                    source: e,
                }
            }
        })
    }
}

/// Fetches documents over HTTP; relative locations are joined onto `base_url`.
#[derive(Debug, Clone)]
pub struct HttpDocumentSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentSource {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    #[must_use]
    pub fn url_for(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_owned()
        } else {
            format!("{}/{}", self.base_url, location.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        let url = self.url_for(location);
        tracing::debug!(%url, "fetching document");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(location.to_owned()));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                location: location.to_owned(),
                status,
            });
        }
        Ok(response.text().await?)
    }
}

/// In-memory document map for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentSource {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryDocumentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(self, location: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(location, body);
        self
    }

    pub fn insert(&self, location: impl Into<String>, body: impl Into<String>) {
        let mut guard = self
            .documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(location.into(), body.into());
    }

    pub fn remove(&self, location: &str) {
        let mut guard = self
            .documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.remove(location);
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn fetch(&self, location: &str) -> Result<String, SourceError> {
        let guard = self
            .documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .get(location)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(location.to_owned()))
    }
}
