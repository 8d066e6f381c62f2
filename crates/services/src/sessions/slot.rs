use tracing::debug;

use super::service::QuizSession;
use crate::error::SessionError;

/// Proof that a quiz load was requested; only the most recent ticket may install a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holder for the session the front end is currently driving.
///
/// Quiz loads are asynchronous and may overlap. Each load takes a ticket from
/// `begin_load`; a ticket older than the latest one is rejected by `install`, so a
/// slow response can never replace the session a newer load already installed.
#[derive(Debug, Default)]
pub struct SessionSlot {
    generation: u64,
    session: Option<QuizSession>,
}

impl SessionSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new load. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Install the session produced by `ticket`'s load, replacing any previous session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleLoad` if a newer load has begun since `ticket` was issued;
    /// the slot is left untouched.
    pub fn install(
        &mut self,
        ticket: LoadTicket,
        session: QuizSession,
    ) -> Result<&mut QuizSession, SessionError> {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.generation,
                latest = self.generation,
                quiz = %session.quiz_id(),
                "discarding stale quiz load"
            );
            return Err(SessionError::StaleLoad);
        }
        Ok(self.session.insert(session))
    }

    /// Record that `ticket`'s load failed. The slot keeps whatever it held before.
    ///
    /// Returns the error back when it belongs to the latest load, so the caller can show
    /// it; errors from stale loads are swallowed as `None`.
    pub fn fail_load(&self, ticket: LoadTicket, error: SessionError) -> Option<SessionError> {
        if self.is_current(ticket) {
            Some(error)
        } else {
            debug!(ticket = ticket.generation, %error, "ignoring failure of stale quiz load");
            None
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        self.session.as_mut()
    }

    /// Hand back the session once it has completed; an active session stays in place.
    pub fn take_completed(&mut self) -> Option<QuizSession> {
        if self.session.as_ref().is_some_and(QuizSession::is_completed) {
            self.session.take()
        } else {
            None
        }
    }

    /// Drop the current session, returning to idle.
    pub fn clear(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Answer, Question, QuestionKind, QuestionNumber, QuizId};

    fn session(path: &str) -> QuizSession {
        let question = Question::new(
            QuestionNumber::new(1),
            QuestionKind::Single,
            "Q",
            vec![Answer::new("yes", true), Answer::new("no", false)],
        );
        QuizSession::start_in_order(QuizId::new(path), vec![question]).unwrap()
    }

    #[test]
    fn slot_starts_idle() {
        let slot = SessionSlot::new();
        assert!(slot.session().is_none());
    }

    #[test]
    fn stale_load_cannot_replace_newer_session() {
        let mut slot = SessionSlot::new();
        let first = slot.begin_load();
        let second = slot.begin_load();

        slot.install(second, session("new.json")).unwrap();
        let err = slot.install(first, session("old.json")).unwrap_err();

        assert!(matches!(err, SessionError::StaleLoad));
        assert_eq!(slot.session().unwrap().quiz_id().as_str(), "new.json");
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let mut slot = SessionSlot::new();
        let ticket = slot.begin_load();
        slot.install(ticket, session("a.json")).unwrap();

        let retry = slot.begin_load();
        let surfaced = slot.fail_load(retry, SessionError::EmptyQuiz);
        assert!(matches!(surfaced, Some(SessionError::EmptyQuiz)));
        assert_eq!(slot.session().unwrap().quiz_id().as_str(), "a.json");
    }

    #[test]
    fn stale_failure_is_swallowed() {
        let mut slot = SessionSlot::new();
        let old = slot.begin_load();
        let _new = slot.begin_load();
        assert!(slot.fail_load(old, SessionError::EmptyQuiz).is_none());
    }

    #[test]
    fn take_completed_only_returns_finished_sessions() {
        let mut slot = SessionSlot::new();
        let ticket = slot.begin_load();
        slot.install(ticket, session("a.json")).unwrap();
        assert!(slot.take_completed().is_none());

        slot.session_mut()
            .unwrap()
            .submit_single(QuestionNumber::new(1), 0)
            .unwrap();
        let done = slot.take_completed().unwrap();
        assert!(done.is_completed());
        assert!(slot.session().is_none());
    }
}
