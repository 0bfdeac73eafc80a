//! What can happen during an attempt, and where it comes from.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use exampro_core::model::{AnswerValue, Question};
use exampro_core::session::ViolationKind;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One step of an attempt, as typed by the student or replayed from a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AttemptEvent {
    /// Replace the answer to a question.
    Answer { question: String, value: AnswerValue },
    /// Flip one option of a complex-choice answer.
    Toggle { question: String, option: String },
    /// Set one pair of a matching answer.
    Pair {
        question: String,
        left: String,
        right: String,
    },
    /// Jump to a question (zero-based).
    Goto { index: usize },
    Next,
    Previous,
    /// The environment lost visibility.
    Hidden,
    /// The environment left full-screen.
    FullscreenExit,
    /// Someone tried to close the window.
    CloseAttempt,
    Submit {
        #[serde(default = "default_confirm")]
        confirm: bool,
    },
}

fn default_confirm() -> bool {
    true
}

/// A signal raised by the environment rather than the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvSignal {
    Departure(ViolationKind),
    CloseAttempt,
}

impl From<EnvSignal> for AttemptEvent {
    fn from(signal: EnvSignal) -> Self {
        match signal {
            EnvSignal::Departure(ViolationKind::Hidden) => AttemptEvent::Hidden,
            EnvSignal::Departure(ViolationKind::FullscreenExit) => AttemptEvent::FullscreenExit,
            EnvSignal::CloseAttempt => AttemptEvent::CloseAttempt,
        }
    }
}

/// Feedback from the driver to whoever is feeding it events.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A close attempt was refused while the attempt is running.
    CloseWarning,
    /// A departure was counted.
    ViolationRecorded { count: u32 },
    /// The session rejected an event.
    Rejected(String),
    /// Submission was not confirmed; the attempt continues.
    SubmitDeclined,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Producer of student events.
#[async_trait]
pub trait EventSource: Send {
    /// Wait for the next event. `None` means the input has ended.
    ///
    /// `current` is the question on screen. Implementations must be cancel
    /// safe: the driver drops this future when an environmental signal wins.
    async fn next_event(&mut self, current: Option<&Question>) -> Result<Option<AttemptEvent>>;

    /// Receive feedback about the attempt. Ignored by default.
    async fn notify(&mut self, _notice: Notice) -> Result<()> {
        Ok(())
    }
}

/// Replays a fixed list of events.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    events: VecDeque<AttemptEvent>,
    notices: Vec<Notice>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = AttemptEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            notices: Vec::new(),
        }
    }

    /// Events not yet handed out.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// Every notice received so far.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&mut self, _current: Option<&Question>) -> Result<Option<AttemptEvent>> {
        Ok(self.events.pop_front())
    }

    async fn notify(&mut self, notice: Notice) -> Result<()> {
        self.notices.push(notice);
        Ok(())
    }
}

/// Load a JSON array of events.
pub fn load_script(path: &Path) -> Result<Vec<AttemptEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse script: {}", path.display()))
}
