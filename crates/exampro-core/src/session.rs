//! Lifecycle of one exam attempt.
//!
//! ```text
//! NOT_STARTED -> IDENTITY_CAPTURE -> LOCKED_ACTIVE -> SUBMITTING -> FINISHED
//!                       |
//!                       +-> CANCELLED
//! ```
//!
//! All transitions are driven by discrete calls on a single [`Session`].
//! Environmental signals (page hidden, window close) arrive through
//! [`Session::record_violation`] and [`Session::close_requested`] and never
//! move the session on their own.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answers::AnswerStore;
use crate::authoring::generate_student_id;
use crate::error::SessionError;
use crate::model::{AnswerValue, Exam, Question, StudentResult};
use crate::scoring;
use crate::traits::{Lockdown, ResultSink};

/// Where an attempt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NotStarted,
    IdentityCapture,
    LockedActive,
    Submitting,
    Finished,
    Cancelled,
}

impl Phase {
    /// No transition leaves a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::Cancelled)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::NotStarted => "NOT_STARTED",
            Phase::IdentityCapture => "IDENTITY_CAPTURE",
            Phase::LockedActive => "LOCKED_ACTIVE",
            Phase::Submitting => "SUBMITTING",
            Phase::Finished => "FINISHED",
            Phase::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A departure from the attempt reported by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The page or terminal lost visibility (tab or window switch).
    Hidden,
    /// The environment left full-screen mode.
    FullscreenExit,
}

/// One recorded violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub at: DateTime<Utc>,
}

/// Answer to a window-close attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Nothing to lose; let the environment close.
    Allow,
    /// An attempt is in progress; the environment should warn the user.
    Warn,
}

/// What a submit call did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The user declined the confirmation; the session is still active.
    Declined,
    /// The attempt was scored and handed off.
    Finished(StudentResult),
}

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Prefix of the student id generated when none is supplied.
    pub student_id_prefix: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            student_id_prefix: "SIS-".to_string(),
        }
    }
}

/// One exam attempt. Not persisted; dropped after submission or cancel.
pub struct Session {
    exam: Arc<Exam>,
    phase: Phase,
    options: SessionOptions,
    student_name: String,
    student_id: Option<String>,
    current_index: usize,
    answers: AnswerStore,
    violations: Vec<Violation>,
    lockdown: Box<dyn Lockdown>,
    lockdown_engaged: bool,
    result: Option<StudentResult>,
}

impl Session {
    pub fn new(exam: impl Into<Arc<Exam>>, lockdown: Box<dyn Lockdown>) -> Self {
        Self {
            exam: exam.into(),
            phase: Phase::NotStarted,
            options: SessionOptions::default(),
            student_name: String::new(),
            student_id: None,
            current_index: 0,
            answers: AnswerStore::new(),
            violations: Vec::new(),
            lockdown,
            lockdown_engaged: false,
            result: None,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Enter identity capture.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        self.require(Phase::NotStarted, "begin")?;
        self.transition(Phase::IdentityCapture);
        Ok(())
    }

    /// Capture the student's identity and start the monitored attempt.
    ///
    /// A blank name leaves the session in identity capture.
    pub fn start(&mut self, student_name: &str, student_id: Option<&str>) -> Result<(), SessionError> {
        self.require(Phase::IdentityCapture, "start")?;
        let name = student_name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        self.student_name = name.to_string();
        self.student_id = student_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.current_index = 0;
        self.answers = AnswerStore::new();
        self.violations.clear();

        match self.lockdown.engage() {
            Ok(()) => self.lockdown_engaged = true,
            Err(e) => tracing::warn!("lockdown activation failed, continuing: {e:#}"),
        }

        self.transition(Phase::LockedActive);
        tracing::info!(
            exam = %self.exam.id,
            student = %self.student_name,
            "attempt started ({} questions)",
            self.exam.question_count()
        );
        Ok(())
    }

    /// Abort before the attempt starts. Nothing is recorded.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.require(Phase::IdentityCapture, "cancel")?;
        self.transition(Phase::Cancelled);
        Ok(())
    }

    /// Score the attempt and hand the result to `sink`.
    ///
    /// When `confirmed` is false nothing changes. Otherwise the answers are
    /// snapshotted, scored, the lockdown is released, and the session
    /// becomes terminal.
    pub fn submit(
        &mut self,
        confirmed: bool,
        sink: &mut dyn ResultSink,
    ) -> Result<SubmitOutcome, SessionError> {
        self.require(Phase::LockedActive, "submit")?;
        if !confirmed {
            tracing::debug!("submit declined");
            return Ok(SubmitOutcome::Declined);
        }

        self.transition(Phase::Submitting);
        let snapshot = self.answers.snapshot();
        let summary = scoring::score(&self.exam.questions, &snapshot);

        let result = StudentResult {
            id: Uuid::new_v4().to_string(),
            exam_id: self.exam.id.clone(),
            student_name: self.student_name.clone(),
            student_id: self
                .student_id
                .clone()
                .unwrap_or_else(|| generate_student_id(&self.options.student_id_prefix)),
            score: summary.total_score,
            total_possible_score: summary.max_possible,
            answers: snapshot,
            timestamp: Utc::now(),
            violation_count: self.violation_count(),
        };

        self.release_lockdown();
        sink.accept(&result);
        self.result = Some(result.clone());
        self.transition(Phase::Finished);

        tracing::info!(
            exam = %self.exam.id,
            student = %self.student_name,
            score = result.score,
            max = result.total_possible_score,
            violations = result.violation_count,
            "attempt finished"
        );
        Ok(SubmitOutcome::Finished(result))
    }

    // -----------------------------------------------------------------------
    // Within LOCKED_ACTIVE
    // -----------------------------------------------------------------------

    /// Jump to any question.
    pub fn goto(&mut self, index: usize) -> Result<(), SessionError> {
        self.require(Phase::LockedActive, "navigate")?;
        let count = self.exam.question_count();
        if index >= count {
            return Err(SessionError::QuestionOutOfRange { index, count });
        }
        self.current_index = index;
        Ok(())
    }

    /// Move forward one question; stays put on the last one.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.require(Phase::LockedActive, "navigate")?;
        if self.current_index + 1 < self.exam.question_count() {
            self.current_index += 1;
        }
        Ok(self.current_index)
    }

    /// Move back one question; stays put on the first one.
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.require(Phase::LockedActive, "navigate")?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(self.current_index)
    }

    /// Store an answer. The value is not checked against the question.
    pub fn answer(&mut self, question_id: &str, value: AnswerValue) -> Result<(), SessionError> {
        self.require(Phase::LockedActive, "answer")?;
        if self.exam.question(question_id).is_none() {
            tracing::debug!("answer for unknown question {question_id}");
        }
        self.answers.set(question_id, value);
        Ok(())
    }

    /// Toggle one option of a complex-choice answer.
    pub fn toggle_option(&mut self, question_id: &str, option: &str) -> Result<(), SessionError> {
        self.require(Phase::LockedActive, "answer")?;
        self.answers.toggle(question_id, option);
        Ok(())
    }

    /// Choose the right-hand value for one left item of a matching answer.
    pub fn set_pair(&mut self, question_id: &str, left: &str, right: &str) -> Result<(), SessionError> {
        self.require(Phase::LockedActive, "answer")?;
        self.answers.set_pair(question_id, left, right);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Environmental signals
    // -----------------------------------------------------------------------

    /// Count a departure. Returns whether it was counted: only an active
    /// attempt counts; submission and terminal phases ignore it.
    pub fn record_violation(&mut self, kind: ViolationKind) -> bool {
        if self.phase != Phase::LockedActive {
            tracing::debug!(phase = %self.phase, "ignoring {kind:?} signal");
            return false;
        }
        self.violations.push(Violation {
            kind,
            at: Utc::now(),
        });
        tracing::warn!(
            student = %self.student_name,
            count = self.violations.len(),
            "left the exam ({kind:?})"
        );
        true
    }

    /// The environment is about to close. The core cannot prevent it.
    pub fn close_requested(&self) -> CloseDecision {
        if self.phase == Phase::LockedActive {
            CloseDecision::Warn
        } else {
            CloseDecision::Allow
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.exam.questions.get(self.current_index)
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn violation_count(&self) -> u32 {
        self.violations.len() as u32
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// `(answered, total)` questions.
    pub fn progress(&self) -> (usize, usize) {
        let answered = self
            .exam
            .questions
            .iter()
            .filter(|q| self.answers.is_answered(&q.id))
            .count();
        (answered, self.exam.question_count())
    }

    /// The result produced on submission.
    pub fn result(&self) -> Option<&StudentResult> {
        self.result.as_ref()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require(&self, expected: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn transition(&mut self, to: Phase) {
        tracing::debug!(from = %self.phase, to = %to, "session transition");
        self.phase = to;
    }

    fn release_lockdown(&mut self) {
        if !self.lockdown_engaged {
            return;
        }
        self.lockdown_engaged = false;
        if let Err(e) = self.lockdown.release() {
            tracing::warn!("lockdown release failed: {e:#}");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.lockdown_engaged {
            tracing::warn!(
                exam = %self.exam.id,
                "session dropped during an active attempt; unsubmitted answers are lost"
            );
            self.release_lockdown();
        }
    }
}
