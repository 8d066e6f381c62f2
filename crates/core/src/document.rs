//! JSON shapes of the manifest and quiz documents, and their mapping into the model.

use serde::Deserialize;

use crate::error::DocumentError;
use crate::model::{
    Answer, Manifest, ManifestEntry, Question, QuestionContent, QuestionKind, QuestionNumber,
};

#[derive(Debug, Clone, Deserialize)]
struct ManifestDocument {
    quizzes: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuizDocument {
    quiz: QuizBody,
}

#[derive(Debug, Clone, Deserialize)]
struct QuizBody {
    questions: Vec<QuestionDocument>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestionDocument {
    number: i64,
    #[serde(rename = "type", default)]
    kind: String,
    content: ContentDocument,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentDocument {
    text: String,
    answers: Vec<AnswerDocument>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnswerDocument {
    text: String,
    #[serde(default)]
    is_correct: bool,
}

impl From<QuestionDocument> for Question {
    fn from(doc: QuestionDocument) -> Self {
        Question {
            number: QuestionNumber::new(doc.number),
            kind: QuestionKind::from_tag(&doc.kind),
            content: QuestionContent {
                text: doc.content.text,
                answers: doc
                    .content
                    .answers
                    .into_iter()
                    .map(|a| Answer::new(a.text, a.is_correct))
                    .collect(),
            },
        }
    }
}

/// Parse a manifest document: `{ "quizzes": [ { "category", "name", "path" } ] }`.
///
/// # Errors
///
/// Returns `DocumentError::Json` if the text is not a valid manifest.
pub fn parse_manifest(raw: &str) -> Result<Manifest, DocumentError> {
    let doc: ManifestDocument = serde_json::from_str(raw)?;
    Ok(Manifest::new(doc.quizzes))
}

/// Parse a quiz document and normalize each question's `type` tag.
///
/// # Errors
///
/// Returns `DocumentError::Json` if the text is not a valid quiz document.
pub fn parse_quiz(raw: &str) -> Result<Vec<Question>, DocumentError> {
    let doc: QuizDocument = serde_json::from_str(raw)?;
    Ok(doc.quiz.questions.into_iter().map(Question::from).collect())
}
