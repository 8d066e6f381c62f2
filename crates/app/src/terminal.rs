//! Plain-text rendering and keyboard input for the terminal front end.

use std::fmt;

use quiz_core::model::{Question, QuestionKind, ResultRecord};
use services::{AnswerFeedback, CatalogQuestion, SessionProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    NotANumber(String),
    OutOfRange { choice: usize, len: usize },
    ExpectedOne { given: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NotANumber(raw) => write!(f, "not an answer number: {raw}"),
            InputError::OutOfRange { choice, len } => {
                write!(f, "answer {choice} does not exist (choose 1-{len})")
            }
            InputError::ExpectedOne { given } => {
                write!(f, "choose exactly one answer ({given} given)")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Parse a line of 1-based answer numbers separated by commas or whitespace
/// into 0-based indices. An empty line is an empty selection.
pub fn parse_selection(line: &str, answer_count: usize) -> Result<Vec<usize>, InputError> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let choice: usize = part
                .parse()
                .map_err(|_| InputError::NotANumber(part.to_owned()))?;
            if choice == 0 || choice > answer_count {
                return Err(InputError::OutOfRange {
                    choice,
                    len: answer_count,
                });
            }
            Ok(choice - 1)
        })
        .collect()
}

/// Single-answer questions take exactly one number.
pub fn parse_single(line: &str, answer_count: usize) -> Result<usize, InputError> {
    match parse_selection(line, answer_count)?.as_slice() {
        [index] => Ok(*index),
        other => Err(InputError::ExpectedOne { given: other.len() }),
    }
}

pub fn render_question(question: &Question, progress: &SessionProgress) -> String {
    let mut out = format!(
        "\n[{}/{} answered, {} to retake]\nQuestion {}: {}\n",
        progress.answered,
        progress.total,
        progress.pending_retakes,
        question.number,
        question.text()
    );
    for (i, answer) in question.answers().iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, answer.text));
    }
    out.push_str(match question.kind {
        QuestionKind::Single => "Your answer: ",
        QuestionKind::Multi => "Your answers (e.g. 1,3; empty for none): ",
    });
    out
}

pub fn render_feedback(feedback: &AnswerFeedback) -> String {
    if feedback.is_correct {
        "Correct!".to_owned()
    } else {
        format!(
            "Incorrect. Try again!\nCorrect answer: {}",
            feedback.correct_answer
        )
    }
}

pub fn render_result(record: &ResultRecord) -> String {
    let mut out = format!(
        "\nQuiz completed!\nScore: {}\nCorrect answers: {}\nIncorrect attempts: {}\n",
        record.score_summary(),
        record.correct(),
        record.incorrect()
    );
    if !record.details().is_empty() {
        out.push_str("\nMistakes:\n");
        for mistake in record.details() {
            out.push_str(&format!(
                "- {}\n  Your answer: {}\n  Correct answer: {}\n",
                mistake.question, mistake.selected_answer, mistake.correct_answer
            ));
        }
    }
    out
}

pub fn render_search_hit(hit: &CatalogQuestion) -> String {
    let question = &hit.question;
    let mut out = format!(
        "Question {} (from {} - {})\n{}\n",
        question.number,
        hit.category,
        hit.quiz_name,
        question.text()
    );
    for text in question.correct_answers() {
        out.push_str(&format!("  + {text}\n"));
    }
    for text in question.incorrect_answers() {
        out.push_str(&format!("  - {text}\n"));
    }
    out
}
