use std::collections::VecDeque;
use std::fmt;

use quiz_core::model::{
    MistakeEntry, Question, QuestionKind, QuestionNumber, QuizId, ResultRecord,
};
use rand::Rng;
use tracing::debug;

use super::progress::SessionProgress;
use crate::error::{SessionError, SubmissionError};

/// Mistake text logged when a multi-select question is submitted with nothing ticked.
pub const NO_ANSWER_SELECTED: &str = "No answer selected";

//
// ─── STATE & FEEDBACK ──────────────────────────────────────────────────────────
//

/// Lifecycle of a started session. "Idle" is the absence of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
}

/// Outcome of one submission, for immediate feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_number: QuestionNumber,
    pub is_correct: bool,
    pub correct_answer: String,
    pub is_complete: bool,
}

/// Uniform in-place Fisher–Yates shuffle driven by the given RNG.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at one quiz.
///
/// Questions are presented in shuffled order. A wrong answer puts the question on the
/// retake queue and it is shown again, ahead of any fresh question, until it is answered
/// correctly. The session completes once every question has been answered correctly.
pub struct QuizSession {
    quiz_id: QuizId,
    questions: Vec<Question>,
    cursor: usize,
    // Positions into `questions`; never holds the same position twice.
    retakes: VecDeque<usize>,
    score: u32,
    correct: u32,
    incorrect: u32,
    mistakes: Vec<MistakeEntry>,
}

impl QuizSession {
    /// Start a session over a shuffled permutation of `questions`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuiz` if no questions are provided.
    pub fn start<R: Rng + ?Sized>(
        quiz_id: QuizId,
        mut questions: Vec<Question>,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        shuffle(&mut questions, rng);
        Self::start_in_order(quiz_id, questions)
    }

    /// Start a session that presents `questions` in the given order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuiz` if no questions are provided.
    pub fn start_in_order(quiz_id: QuizId, questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }

        debug!(quiz = %quiz_id, questions = questions.len(), "quiz session started");

        Ok(Self {
            quiz_id,
            questions,
            cursor: 0,
            retakes: VecDeque::new(),
            score: 0,
            correct: 0,
            incorrect: 0,
            mistakes: Vec::new(),
        })
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    /// Questions in presentation order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect_count(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn mistakes(&self) -> &[MistakeEntry] {
        &self.mistakes
    }

    /// Numbers of the questions waiting to be retaken, head first.
    #[must_use]
    pub fn retake_queue(&self) -> Vec<QuestionNumber> {
        self.retakes
            .iter()
            .map(|&pos| self.questions[pos].number)
            .collect()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.retakes.is_empty() && self.cursor == self.questions.len()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_completed() {
            SessionState::Completed
        } else {
            SessionState::Active
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.cursor,
            pending_retakes: self.retakes.len(),
            remaining: self.questions.len().saturating_sub(self.cursor),
            is_complete: self.is_completed(),
        }
    }

    fn current_position(&self) -> Option<usize> {
        if let Some(&pos) = self.retakes.front() {
            return Some(pos);
        }
        (self.cursor < self.questions.len()).then_some(self.cursor)
    }

    /// The question to present next: the retake-queue head first, then the next fresh one.
    ///
    /// Returns `None` once the session is completed.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_position().map(|pos| &self.questions[pos])
    }

    fn check_current(
        &self,
        number: QuestionNumber,
        expected: QuestionKind,
    ) -> Result<usize, SubmissionError> {
        let Some(pos) = self.current_position() else {
            return Err(SubmissionError::SessionCompleted);
        };
        let question = &self.questions[pos];
        if question.number != number {
            return Err(SubmissionError::NotCurrent {
                current: question.number,
                submitted: number,
            });
        }
        if question.kind != expected {
            return Err(SubmissionError::WrongKind {
                number,
                expected,
                actual: question.kind,
            });
        }
        Ok(pos)
    }

    /// Submit the answer at `selected` for the current single-select question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSubmission` if `number` is not the current question,
    /// the question is multi-select, the index is out of range, or the session is completed.
    pub fn submit_single(
        &mut self,
        number: QuestionNumber,
        selected: usize,
    ) -> Result<AnswerFeedback, SessionError> {
        let pos = self.check_current(number, QuestionKind::Single)?;
        let question = &self.questions[pos];
        let answer = question
            .answer(selected)
            .ok_or(SubmissionError::AnswerOutOfRange {
                index: selected,
                len: question.answers().len(),
            })?;

        let is_correct = answer.is_correct;
        let selected_text = answer.text.clone();
        let correct_text = question.correct_answer_text();

        Ok(self.record(pos, is_correct, selected_text, correct_text))
    }

    /// Submit the set of ticked answers for the current multi-select question.
    ///
    /// Correct only when the selection is exactly the set of correct answers; order and
    /// repeated indices do not matter.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSubmission` if `number` is not the current question,
    /// the question is single-select, any index is out of range, or the session is completed.
    pub fn submit_multi(
        &mut self,
        number: QuestionNumber,
        selected: &[usize],
    ) -> Result<AnswerFeedback, SessionError> {
        let pos = self.check_current(number, QuestionKind::Multi)?;
        let question = &self.questions[pos];
        let len = question.answers().len();
        if let Some(&index) = selected.iter().find(|&&i| i >= len) {
            return Err(SubmissionError::AnswerOutOfRange { index, len }.into());
        }

        let mut chosen = selected.to_vec();
        chosen.sort_unstable();
        chosen.dedup();

        let is_correct = chosen == question.correct_indices();
        let selected_text = if chosen.is_empty() {
            NO_ANSWER_SELECTED.to_owned()
        } else {
            question.answers_text_for(&chosen)
        };
        let correct_text = question.correct_answer_text();

        Ok(self.record(pos, is_correct, selected_text, correct_text))
    }

    fn record(
        &mut self,
        pos: usize,
        is_correct: bool,
        selected_text: String,
        correct_text: String,
    ) -> AnswerFeedback {
        let number = self.questions[pos].number;

        if is_correct {
            self.score = self.score.saturating_add(1);
            self.correct = self.correct.saturating_add(1);
            if self.retakes.front() == Some(&pos) {
                self.retakes.pop_front();
            }
            if pos == self.cursor {
                self.cursor += 1;
            }
            debug!(question = %number, score = self.score, "answered correctly");
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
            self.mistakes.push(MistakeEntry {
                question: self.questions[pos].content.text.clone(),
                selected_answer: selected_text,
                correct_answer: correct_text.clone(),
            });
            if !self.retakes.contains(&pos) {
                self.retakes.push_back(pos);
            }
            debug!(question = %number, retakes = self.retakes.len(), "answered incorrectly");
        }

        AnswerFeedback {
            question_number: number,
            is_correct,
            correct_answer: correct_text,
            is_complete: self.is_completed(),
        }
    }

    /// Summarize the finished attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while questions remain.
    pub fn build_result(&self) -> Result<ResultRecord, SessionError> {
        if !self.is_completed() {
            return Err(SessionError::NotCompleted);
        }
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        Ok(ResultRecord::from_persisted(
            self.score,
            total,
            self.correct,
            self.incorrect,
            self.mistakes.clone(),
        )?)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz_id)
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("retakes", &self.retakes)
            .field("score", &self.score)
            .field("correct", &self.correct)
            .field("incorrect", &self.incorrect)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Answer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn single(number: i64, text: &str, answers: &[(&str, bool)]) -> Question {
        Question::new(
            QuestionNumber::new(number),
            QuestionKind::Single,
            text,
            answers.iter().map(|(t, c)| Answer::new(*t, *c)).collect(),
        )
    }

    fn multi(number: i64, text: &str, answers: &[(&str, bool)]) -> Question {
        Question::new(
            QuestionNumber::new(number),
            QuestionKind::Multi,
            text,
            answers.iter().map(|(t, c)| Answer::new(*t, *c)).collect(),
        )
    }

    fn capital() -> Question {
        single(
            1,
            "Capital of France?",
            &[("Lyon", false), ("Paris", true), ("Nice", false)],
        )
    }

    fn letters() -> Question {
        multi(
            2,
            "Pick A and C",
            &[("A", true), ("B", false), ("C", true)],
        )
    }

    fn quiz_of(n: i64) -> Vec<Question> {
        (1..=n)
            .map(|i| {
                if i % 2 == 0 {
                    multi(i, &format!("M{i}"), &[("x", true), ("y", false), ("z", true)])
                } else {
                    single(i, &format!("S{i}"), &[("no", false), ("yes", true)])
                }
            })
            .collect()
    }

    fn answer_correctly(session: &mut QuizSession) -> AnswerFeedback {
        let q = session.current_question().unwrap().clone();
        match q.kind {
            QuestionKind::Single => session
                .submit_single(q.number, q.correct_indices()[0])
                .unwrap(),
            QuestionKind::Multi => session.submit_multi(q.number, &q.correct_indices()).unwrap(),
        }
    }

    fn answer_wrong(session: &mut QuizSession) -> AnswerFeedback {
        let q = session.current_question().unwrap().clone();
        match q.kind {
            QuestionKind::Single => {
                let wrong = q.answers().iter().position(|a| !a.is_correct).unwrap();
                session.submit_single(q.number, wrong).unwrap()
            }
            QuestionKind::Multi => session.submit_multi(q.number, &[]).unwrap(),
        }
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = QuizSession::start(QuizId::new("q.json"), Vec::new(), &mut rng).unwrap_err();
        assert!(matches!(err, SessionError::EmptyQuiz));
    }

    #[test]
    fn start_produces_a_permutation() {
        let original = quiz_of(9);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let session =
                QuizSession::start(QuizId::new("q.json"), original.clone(), &mut rng).unwrap();
            assert_eq!(session.total_questions(), original.len());

            let mut numbers: Vec<_> = session.questions().iter().map(|q| q.number).collect();
            numbers.sort();
            let expected: Vec<_> = original.iter().map(|q| q.number).collect();
            assert_eq!(numbers, expected);
        }
    }

    #[test]
    fn shuffle_is_reproducible_for_a_seed() {
        let mut a = (0..32).collect::<Vec<_>>();
        let mut b = a.clone();
        shuffle(&mut a, &mut StdRng::seed_from_u64(7));
        shuffle(&mut b, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_ne!(a, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn worked_example_matches_expected_result() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("demo.json"), vec![capital(), letters()])
                .unwrap();

        let fb = session.submit_single(QuestionNumber::new(1), 1).unwrap();
        assert!(fb.is_correct);
        assert_eq!(fb.correct_answer, "Paris");
        assert_eq!(session.score(), 1);
        assert_eq!(session.cursor(), 1);

        let fb = session.submit_multi(QuestionNumber::new(2), &[0]).unwrap();
        assert!(!fb.is_correct);
        assert_eq!(session.incorrect_count(), 1);
        assert_eq!(session.retake_queue(), vec![QuestionNumber::new(2)]);
        assert_eq!(session.current_question().unwrap().number, QuestionNumber::new(2));

        let fb = session.submit_multi(QuestionNumber::new(2), &[2, 0]).unwrap();
        assert!(fb.is_correct);
        assert!(fb.is_complete);
        assert_eq!(session.score(), 2);
        assert!(session.retake_queue().is_empty());
        assert_eq!(session.cursor(), 2);
        assert!(session.is_completed());
        assert_eq!(session.state(), SessionState::Completed);

        let result = session.build_result().unwrap();
        assert_eq!(result.score(), 2);
        assert_eq!(result.total_questions(), 2);
        assert_eq!(result.correct(), 2);
        assert_eq!(result.incorrect(), 1);
        assert_eq!(
            result.details(),
            &[MistakeEntry {
                question: "Pick A and C".into(),
                selected_answer: "A".into(),
                correct_answer: "A, C".into(),
            }]
        );
    }

    #[test]
    fn all_correct_terminates_after_exactly_len_submissions() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = QuizSession::start(QuizId::new("q.json"), quiz_of(7), &mut rng).unwrap();

            let mut submissions = 0;
            while !session.is_completed() {
                let fb = answer_correctly(&mut session);
                assert!(fb.is_correct);
                assert!(session.retake_queue().is_empty());
                submissions += 1;
            }
            assert_eq!(submissions, 7);
            assert!(session.current_question().is_none());
        }
    }

    #[test]
    fn repeated_miss_enqueues_once() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![capital(), letters()])
                .unwrap();

        session.submit_single(QuestionNumber::new(1), 0).unwrap();
        session.submit_single(QuestionNumber::new(1), 2).unwrap();

        assert_eq!(session.retake_queue(), vec![QuestionNumber::new(1)]);
        assert_eq!(session.incorrect_count(), 2);
        assert_eq!(session.mistakes().len(), 2);
        assert_eq!(session.mistakes()[1].selected_answer, "Nice");
        assert_eq!(session.mistakes()[1].correct_answer, "Paris");
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn retaken_question_is_presented_before_fresh_ones() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![capital(), letters()])
                .unwrap();

        session.submit_single(QuestionNumber::new(1), 0).unwrap();
        assert_eq!(session.current_question().unwrap().number, QuestionNumber::new(1));

        let err = session.submit_multi(QuestionNumber::new(2), &[0, 2]).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidSubmission(SubmissionError::NotCurrent { .. })
        ));
    }

    #[test]
    fn score_law_holds_with_misses() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = QuizSession::start(QuizId::new("q.json"), quiz_of(6), &mut rng).unwrap();

        let mut wrong = 0;
        let mut step = 0;
        while !session.is_completed() {
            if step % 3 == 0 {
                answer_wrong(&mut session);
                wrong += 1;
            }
            answer_correctly(&mut session);
            step += 1;
        }

        let result = session.build_result().unwrap();
        assert_eq!(result.score(), result.total_questions());
        assert_eq!(result.correct(), result.total_questions());
        assert_eq!(result.incorrect(), wrong);
        assert_eq!(result.details().len(), wrong as usize);
    }

    #[test]
    fn multi_select_requires_the_exact_set() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![letters()]).unwrap();
        let n = QuestionNumber::new(2);

        assert!(!session.submit_multi(n, &[0]).unwrap().is_correct);
        assert!(!session.submit_multi(n, &[0, 1, 2]).unwrap().is_correct);
        assert!(!session.submit_multi(n, &[1]).unwrap().is_correct);
        assert_eq!(session.retake_queue().len(), 1);

        let fb = session.submit_multi(n, &[2, 0, 2]).unwrap();
        assert!(fb.is_correct);
        assert!(session.is_completed());
    }

    #[test]
    fn empty_multi_selection_logs_sentinel_text() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![letters()]).unwrap();
        session.submit_multi(QuestionNumber::new(2), &[]).unwrap();

        let mistake = &session.mistakes()[0];
        assert_eq!(mistake.selected_answer, NO_ANSWER_SELECTED);
        assert_eq!(mistake.correct_answer, "A, C");
    }

    #[test]
    fn superset_mistake_lists_selection_in_answer_order() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![letters()]).unwrap();
        session.submit_multi(QuestionNumber::new(2), &[2, 1, 0]).unwrap();
        assert_eq!(session.mistakes()[0].selected_answer, "A, B, C");
    }

    #[test]
    fn invalid_submissions_are_rejected_without_side_effects() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![capital(), letters()])
                .unwrap();
        let n = QuestionNumber::new(1);

        let err = session.submit_single(n, 3).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidSubmission(SubmissionError::AnswerOutOfRange { index: 3, len: 3 })
        ));

        let err = session.submit_multi(n, &[1]).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidSubmission(SubmissionError::WrongKind { .. })
        ));

        let err = session.submit_single(QuestionNumber::new(99), 0).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidSubmission(SubmissionError::NotCurrent { .. })
        ));

        assert_eq!(session.incorrect_count(), 0);
        assert_eq!(session.correct_count(), 0);
        assert!(session.mistakes().is_empty());
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn multi_out_of_range_index_is_rejected() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![letters()]).unwrap();
        let err = session.submit_multi(QuestionNumber::new(2), &[0, 5]).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidSubmission(SubmissionError::AnswerOutOfRange { index: 5, len: 3 })
        ));
    }

    #[test]
    fn completed_session_rejects_further_answers() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![capital()]).unwrap();
        session.submit_single(QuestionNumber::new(1), 1).unwrap();
        assert!(session.is_completed());

        let err = session.submit_single(QuestionNumber::new(1), 1).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidSubmission(SubmissionError::SessionCompleted)
        ));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn build_result_requires_completion() {
        let session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![capital()]).unwrap();
        assert!(matches!(
            session.build_result().unwrap_err(),
            SessionError::NotCompleted
        ));
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn progress_tracks_cursor_and_retakes() {
        let mut session =
            QuizSession::start_in_order(QuizId::new("q.json"), vec![capital(), letters()])
                .unwrap();
        session.submit_single(QuestionNumber::new(1), 0).unwrap();

        let progress = session.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 0);
        assert_eq!(progress.pending_retakes, 1);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.is_complete);
    }
}
