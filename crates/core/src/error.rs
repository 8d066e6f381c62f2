use thiserror::Error;

/// Errors raised while decoding manifest and quiz documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}
