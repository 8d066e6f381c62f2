use serde::{Deserialize, Serialize};

use crate::model::ids::QuizId;

/// One quiz listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub category: String,
    pub name: String,
    pub path: QuizId,
}

impl ManifestEntry {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            path: QuizId::new(path),
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.path
    }
}

/// Top-level listing of quizzes, grouped by category for browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub quizzes: Vec<ManifestEntry>,
}

impl Manifest {
    #[must_use]
    pub fn new(quizzes: Vec<ManifestEntry>) -> Self {
        Self { quizzes }
    }

    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.quizzes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for entry in &self.quizzes {
            if !out.contains(&entry.category.as_str()) {
                out.push(entry.category.as_str());
            }
        }
        out
    }

    /// Entries belonging to `category`, in manifest order.
    #[must_use]
    pub fn quizzes_in(&self, category: &str) -> Vec<&ManifestEntry> {
        self.quizzes
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    #[must_use]
    pub fn entry(&self, quiz_id: &QuizId) -> Option<&ManifestEntry> {
        self.quizzes.iter().find(|e| &e.path == quiz_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest::new(vec![
            ManifestEntry::new("Geography", "Capitals", "geo/capitals.json"),
            ManifestEntry::new("History", "Rome", "hist/rome.json"),
            ManifestEntry::new("Geography", "Rivers", "geo/rivers.json"),
        ])
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        assert_eq!(manifest().categories(), vec!["Geography", "History"]);
    }

    #[test]
    fn quizzes_in_filters_by_category() {
        let m = manifest();
        let names: Vec<_> = m
            .quizzes_in("Geography")
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Capitals", "Rivers"]);
        assert!(m.quizzes_in("Art").is_empty());
    }

    #[test]
    fn entry_looks_up_by_path() {
        let m = manifest();
        let found = m.entry(&QuizId::new("hist/rome.json")).unwrap();
        assert_eq!(found.name, "Rome");
        assert!(m.entry(&QuizId::new("missing.json")).is_none());
    }
}
