mod progress;
mod service;
mod slot;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::{SessionError, SubmissionError};
pub use progress::SessionProgress;
pub use service::{AnswerFeedback, NO_ANSWER_SELECTED, QuizSession, SessionState, shuffle};
pub use slot::{LoadTicket, SessionSlot};
pub use workflow::SessionLoopService;
