//! Session error types.
//!
//! Grading itself never fails; these errors cover misuse of a
//! [`QuizSession`](crate::session::QuizSession).

use thiserror::Error;

use crate::model::Id;

/// Errors raised while recording answers or submitting a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The quiz has no question with this id.
    #[error("unknown question: {0}")]
    UnknownQuestion(Id),

    /// The answer shape does not fit the question kind.
    #[error("question {question} expects a {kind} answer")]
    AnswerShapeMismatch { question: Id, kind: &'static str },

    /// The session was already submitted.
    #[error("quiz session already submitted")]
    AlreadySubmitted,
}

impl SessionError {
    /// Returns `true` if retrying with a different answer could succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::AlreadySubmitted)
    }
}
