mod ids;
mod manifest;
mod question;
mod result;

pub use ids::{ParseIdError, QuestionNumber, QuizId};

pub use manifest::{Manifest, ManifestEntry};
pub use question::{Answer, Question, QuestionContent, QuestionKind};
pub use result::{
    MistakeEntry, RESULT_KEY_PREFIX, ResultRecord, ResultRecordError, result_storage_key,
};
