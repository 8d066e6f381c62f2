#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod search;
pub mod sessions;

pub use sessions as session;

pub use app_services::{AppConfig, AppServices, DEFAULT_DB_URL, DocumentRoot};
pub use catalog::{CatalogQuestion, DEFAULT_MANIFEST, PreloadFailure, PreloadReport, QuizCatalog};
pub use error::{AppServicesError, CatalogError, SessionError, SubmissionError};
pub use search::{DEFAULT_MIN_QUERY_LEN, SearchIndex, SearchOutcome};

pub use sessions::{
    AnswerFeedback, LoadTicket, QuizSession, SessionLoopService, SessionProgress, SessionSlot,
    SessionState,
};
