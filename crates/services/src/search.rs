use crate::catalog::CatalogQuestion;

/// Shortest query, in characters after trimming, that runs a search.
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Result of a free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// The query was shorter than the minimum length; nothing was searched.
    TooShort { min_length: usize },
    /// Matching questions in collection order. May be empty.
    Matches(Vec<&'a CatalogQuestion>),
}

impl SearchOutcome<'_> {
    #[must_use]
    pub fn is_too_short(&self) -> bool {
        matches!(self, Self::TooShort { .. })
    }

    /// Matched questions; empty for `TooShort`.
    #[must_use]
    pub fn matches(&self) -> &[&CatalogQuestion] {
        match self {
            Self::TooShort { .. } => &[],
            Self::Matches(found) => found,
        }
    }
}

/// Read-only substring search over the flattened question collection.
#[derive(Debug, Clone, Copy)]
pub struct SearchIndex<'a> {
    questions: &'a [CatalogQuestion],
    min_length: usize,
}

impl<'a> SearchIndex<'a> {
    #[must_use]
    pub fn new(questions: &'a [CatalogQuestion]) -> Self {
        Self {
            questions,
            min_length: DEFAULT_MIN_QUERY_LEN,
        }
    }

    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Case-insensitive match against each question's text and the space-joined text
    /// of its answers.
    #[must_use]
    pub fn search(&self, query: &str) -> SearchOutcome<'a> {
        let needle = query.to_lowercase();
        let needle = needle.trim();
        if needle.chars().count() < self.min_length {
            return SearchOutcome::TooShort {
                min_length: self.min_length,
            };
        }

        let found = self
            .questions
            .iter()
            .filter(|q| matches_query(q, needle))
            .collect();
        SearchOutcome::Matches(found)
    }
}

fn matches_query(entry: &CatalogQuestion, needle: &str) -> bool {
    if entry.question.text().to_lowercase().contains(needle) {
        return true;
    }
    let answers = entry
        .question
        .answers()
        .iter()
        .map(|a| a.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    answers.contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Answer, Question, QuestionKind, QuestionNumber, QuizId};

    fn entry(number: i64, text: &str, answers: &[&str]) -> CatalogQuestion {
        CatalogQuestion {
            category: "Geography".into(),
            quiz_name: "Capitals".into(),
            quiz_id: QuizId::new("geo.json"),
            question: Question::new(
                QuestionNumber::new(number),
                QuestionKind::Single,
                text,
                answers
                    .iter()
                    .enumerate()
                    .map(|(i, a)| Answer::new(*a, i == 0))
                    .collect(),
            ),
        }
    }

    fn collection() -> Vec<CatalogQuestion> {
        vec![
            entry(1, "What is the capital of France?", &["Paris", "Lyon"]),
            entry(2, "Largest ocean?", &["Pacific", "Atlantic"]),
            entry(3, "Capital of Japan?", &["Tokyo", "Osaka"]),
        ]
    }

    #[test]
    fn short_queries_are_gated() {
        let questions = collection();
        let index = SearchIndex::new(&questions);
        assert!(index.search("ca").is_too_short());
        assert!(index.search("   ca   ").is_too_short());
        assert!(index.search("").is_too_short());
        assert!(index.search("zz").is_too_short());
    }

    #[test]
    fn no_match_is_empty_not_too_short() {
        let questions = collection();
        let outcome = SearchIndex::new(&questions).search("volcano");
        assert_eq!(outcome, SearchOutcome::Matches(Vec::new()));
        assert!(!outcome.is_too_short());
    }

    #[test]
    fn matches_question_text_case_insensitively_in_order() {
        let questions = collection();
        let outcome = SearchIndex::new(&questions).search("  CAPITAL ");
        let numbers: Vec<_> = outcome
            .matches()
            .iter()
            .map(|q| q.question.number.value())
            .collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn matches_answer_text_including_across_answers() {
        let questions = collection();
        let index = SearchIndex::new(&questions);

        let by_answer = index.search("osaka");
        assert_eq!(by_answer.matches().len(), 1);
        assert_eq!(by_answer.matches()[0].question.number.value(), 3);

        let spanning = index.search("pacific atl");
        assert_eq!(spanning.matches().len(), 1);
        assert_eq!(spanning.matches()[0].question.number.value(), 2);
    }

    #[test]
    fn min_length_is_configurable() {
        let questions = collection();
        let index = SearchIndex::new(&questions).with_min_length(1);
        assert_eq!(index.search("?").matches().len(), 3);
        assert_eq!(
            SearchIndex::new(&questions).with_min_length(10).search("capital"),
            SearchOutcome::TooShort { min_length: 10 }
        );
    }

    #[test]
    fn empty_collection_yields_no_matches() {
        let index = SearchIndex::new(&[]);
        assert!(index.is_empty());
        assert_eq!(index.search("anything"), SearchOutcome::Matches(Vec::new()));
    }
}
