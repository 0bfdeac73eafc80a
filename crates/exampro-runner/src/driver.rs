//! The attempt loop.
//!
//! Student events and environmental signals arrive on two independent
//! streams. Signals take priority so a departure is never lost behind a
//! slow reader. The loop ends when the session leaves LOCKED_ACTIVE or the
//! student stream ends.

use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;

use exampro_core::model::StudentResult;
use exampro_core::session::{CloseDecision, Phase, Session, SubmitOutcome, ViolationKind};
use exampro_core::traits::ResultSink;

use crate::events::{AttemptEvent, EnvSignal, EventSource, Notice};

/// How an attempt loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveOutcome {
    /// Submitted and scored.
    Finished(StudentResult),
    /// Input ended before submission. Nothing was recorded.
    Abandoned { answered: usize, total: usize },
}

/// Run an active session until it finishes or input runs out.
///
/// The session must already be in LOCKED_ACTIVE.
pub async fn drive(
    session: &mut Session,
    source: &mut dyn EventSource,
    signals: &mut UnboundedReceiver<EnvSignal>,
    sink: &mut dyn ResultSink,
) -> Result<DriveOutcome> {
    if session.phase() != Phase::LockedActive {
        anyhow::bail!("cannot drive a session in phase {}", session.phase());
    }

    let mut signals_open = true;
    loop {
        let current = session.current_question().cloned();

        let event = tokio::select! {
            biased;
            signal = signals.recv(), if signals_open => match signal {
                Some(signal) => AttemptEvent::from(signal),
                None => {
                    signals_open = false;
                    continue;
                }
            },
            event = source.next_event(current.as_ref()) => match event? {
                Some(event) => event,
                None => {
                    let (answered, total) = session.progress();
                    tracing::info!(answered, total, "input ended before submission");
                    return Ok(DriveOutcome::Abandoned { answered, total });
                }
            },
        };

        if let Some(result) = apply(session, source, event, sink).await? {
            return Ok(DriveOutcome::Finished(result));
        }
    }
}

/// Apply one event. Returns the result once the session has finished.
async fn apply(
    session: &mut Session,
    source: &mut dyn EventSource,
    event: AttemptEvent,
    sink: &mut dyn ResultSink,
) -> Result<Option<StudentResult>> {
    tracing::debug!(?event, "applying");

    let outcome = match event {
        AttemptEvent::Answer { question, value } => session.answer(&question, value),
        AttemptEvent::Toggle { question, option } => session.toggle_option(&question, &option),
        AttemptEvent::Pair {
            question,
            left,
            right,
        } => session.set_pair(&question, &left, &right),
        AttemptEvent::Goto { index } => session.goto(index),
        AttemptEvent::Next => session.next().map(|_| ()),
        AttemptEvent::Previous => session.previous().map(|_| ()),
        AttemptEvent::Hidden => {
            departure(session, source, ViolationKind::Hidden).await?;
            Ok(())
        }
        AttemptEvent::FullscreenExit => {
            departure(session, source, ViolationKind::FullscreenExit).await?;
            Ok(())
        }
        AttemptEvent::CloseAttempt => {
            if session.close_requested() == CloseDecision::Warn {
                tracing::warn!("close attempt during an active exam");
                source.notify(Notice::CloseWarning).await?;
            }
            Ok(())
        }
        AttemptEvent::Submit { confirm } => match session.submit(confirm, sink) {
            Ok(SubmitOutcome::Finished(result)) => return Ok(Some(result)),
            Ok(SubmitOutcome::Declined) => {
                source.notify(Notice::SubmitDeclined).await?;
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = outcome {
        tracing::warn!("event rejected: {e}");
        source.notify(Notice::Rejected(e.to_string())).await?;
    }
    Ok(None)
}

async fn departure(
    session: &mut Session,
    source: &mut dyn EventSource,
    kind: ViolationKind,
) -> Result<()> {
    if session.record_violation(kind) {
        source
            .notify(Notice::ViolationRecorded {
                count: session.violation_count(),
            })
            .await?;
    }
    Ok(())
}
