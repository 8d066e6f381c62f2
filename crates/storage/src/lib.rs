#![forbid(unsafe_code)]

pub mod documents;
pub mod repository;
pub mod sqlite;

pub use documents::{
    DocumentSource, FsDocumentSource, HttpDocumentSource, InMemoryDocumentSource, SourceError,
};
pub use repository::{InMemoryRepository, ResultStore, Storage, StorageError};
