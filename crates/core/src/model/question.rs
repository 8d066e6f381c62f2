use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionNumber;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// How many answers a learner must pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one answer is picked.
    Single,
    /// Any number of answers is picked; all correct ones and nothing else.
    Multi,
}

impl QuestionKind {
    /// Wire tag used in quiz documents for multi-select questions.
    pub const MULTI_TAG: &'static str = "multichoice-multi";

    /// Normalize a document `type` tag. Anything other than the multi tag is single.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag == Self::MULTI_TAG {
            Self::Multi
        } else {
            Self::Single
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}

impl Answer {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionContent {
    pub text: String,
    pub answers: Vec<Answer>,
}

/// A single quiz question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub number: QuestionNumber,
    pub kind: QuestionKind,
    pub content: QuestionContent,
}

//
// ─── QUESTION IMPL ─────────────────────────────────────────────────────────────
//

impl Question {
    pub fn new(
        number: QuestionNumber,
        kind: QuestionKind,
        text: impl Into<String>,
        answers: Vec<Answer>,
    ) -> Self {
        Self {
            number,
            kind,
            content: QuestionContent {
                text: text.into(),
                answers,
            },
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.content.text
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.content.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.content.answers.get(index)
    }

    /// Indices of every answer flagged correct, in answer order.
    #[must_use]
    pub fn correct_indices(&self) -> Vec<usize> {
        self.content
            .answers
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_correct)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn correct_answers(&self) -> impl Iterator<Item = &str> {
        self.content
            .answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.text.as_str())
    }

    pub fn incorrect_answers(&self) -> impl Iterator<Item = &str> {
        self.content
            .answers
            .iter()
            .filter(|a| !a.is_correct)
            .map(|a| a.text.as_str())
    }

    /// Canonical correct-answer text shown as feedback: correct answers joined by `", "`.
    #[must_use]
    pub fn correct_answer_text(&self) -> String {
        self.correct_answers().collect::<Vec<_>>().join(", ")
    }

    /// Text of the given answer indices, in answer order, joined by `", "`.
    ///
    /// Indices that are out of range are skipped.
    #[must_use]
    pub fn answers_text_for(&self, indices: &[usize]) -> String {
        self.content
            .answers
            .iter()
            .enumerate()
            .filter(|(i, _)| indices.contains(i))
            .map(|(_, a)| a.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capitals() -> Question {
        Question::new(
            QuestionNumber::new(1),
            QuestionKind::Multi,
            "Pick the capitals",
            vec![
                Answer::new("Paris", true),
                Answer::new("Lyon", false),
                Answer::new("Rome", true),
            ],
        )
    }

    #[test]
    fn kind_from_tag_defaults_to_single() {
        assert_eq!(QuestionKind::from_tag("multichoice-multi"), QuestionKind::Multi);
        assert_eq!(QuestionKind::from_tag("multichoice-single"), QuestionKind::Single);
        assert_eq!(QuestionKind::from_tag("essay"), QuestionKind::Single);
        assert_eq!(QuestionKind::from_tag(""), QuestionKind::Single);
    }

    #[test]
    fn correct_indices_follow_answer_order() {
        assert_eq!(capitals().correct_indices(), vec![0, 2]);
    }

    #[test]
    fn correct_answer_text_joins_with_comma() {
        assert_eq!(capitals().correct_answer_text(), "Paris, Rome");
        assert_eq!(capitals().incorrect_answers().collect::<Vec<_>>(), vec!["Lyon"]);
    }

    #[test]
    fn answers_text_uses_answer_order_not_selection_order() {
        let q = capitals();
        assert_eq!(q.answers_text_for(&[2, 1]), "Lyon, Rome");
        assert_eq!(q.answers_text_for(&[]), "");
    }
}
