//! Error types surfaced by the core.
//!
//! Only join-time validation is a user-facing failure; the session and
//! authoring errors reject an operation and leave state untouched.

use thiserror::Error;

use crate::session::Phase;

/// Why a student could not join an exam.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// No exam matches the supplied id, title, or link.
    #[error("exam not found: {0}")]
    NotFound(String),

    /// The exam exists but the token differs.
    #[error("wrong token for exam {exam_id}")]
    WrongToken { exam_id: String },

    /// A deep link that does not have the `exam/<id>` shape.
    #[error("invalid exam link: {0}")]
    InvalidLink(String),
}

impl JoinError {
    /// Message shown to the student; one per cause.
    pub fn user_message(&self) -> &'static str {
        match self {
            JoinError::NotFound(_) | JoinError::InvalidLink(_) => {
                "Exam not found. Check the exam ID or token."
            }
            JoinError::WrongToken { .. } => "Wrong token. Ask your teacher for the exam token.",
        }
    }
}

/// A session operation that is not allowed in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while session is {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },

    #[error("student name must not be empty")]
    EmptyName,

    #[error("question index {index} out of range (exam has {count} questions)")]
    QuestionOutOfRange { index: usize, count: usize },
}

/// Authoring rules enforced before an exam reaches the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    #[error("exam already holds the maximum of {max} questions")]
    CapacityExceeded { max: usize },

    #[error("exam {exam_id} has recorded results and can no longer be edited")]
    Locked { exam_id: String },

    #[error("question not found: {0}")]
    QuestionNotFound(String),

    #[error("exam not found: {0}")]
    ExamNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_errors_are_distinguishable() {
        let missing = JoinError::NotFound("nope".into());
        let wrong = JoinError::WrongToken {
            exam_id: "e1".into(),
        };
        assert_ne!(missing.user_message(), wrong.user_message());
        assert_eq!(wrong.to_string(), "wrong token for exam e1");
    }

    #[test]
    fn session_error_names_phase() {
        let err = SessionError::InvalidPhase {
            action: "answer",
            phase: Phase::Finished,
        };
        assert_eq!(err.to_string(), "cannot answer while session is FINISHED");
    }
}
