//! The `exampro take` command.

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;

use exampro_core::catalog::StoreSink;
use exampro_core::error::JoinError;
use exampro_core::join::{join, resolve_deep_link, JoinRequest};
use exampro_core::model::Exam;
use exampro_core::session::Session;
use exampro_core::traits::{Lockdown, NoopLockdown};
use exampro_runner::console::ConsoleSource;
use exampro_runner::{drive, load_script, DriveOutcome, EventSource, ScriptedSource, TerminalLockdown};

use super::AppContext;

pub struct TakeArgs {
    pub exam: Option<String>,
    pub link: Option<String>,
    pub token: String,
    pub name: String,
    pub student_id: Option<String>,
    pub script: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: TakeArgs) -> Result<()> {
    let ctx = AppContext::load(args.config.as_deref())?;
    let catalog = ctx.store.load()?;

    let exam = find_exam(&catalog.exams, &args).map_err(|e| {
        tracing::debug!("join failed: {e}");
        anyhow::anyhow!(e.user_message())
    })?;

    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
    // Scripted runs are unattended, so Ctrl-C keeps its usual meaning.
    let lockdown: Box<dyn Lockdown> = if args.script.is_some() {
        drop(signal_tx);
        Box::new(NoopLockdown)
    } else {
        Box::new(TerminalLockdown::new(signal_tx))
    };

    let mut session = Session::new(exam, lockdown).with_options(ctx.config.session_options());
    session.begin()?;
    session.start(&args.name, args.student_id.as_deref())?;

    let mut source: Box<dyn EventSource> = match &args.script {
        Some(path) => Box::new(ScriptedSource::new(load_script(path)?)),
        None => {
            println!(
                "{} ({} questions). Type :help for commands.",
                session.exam().title,
                session.exam().question_count()
            );
            Box::new(ConsoleSource::stdio())
        }
    };

    let mut sink = StoreSink::new(ctx.store.as_ref());
    let outcome = drive(&mut session, source.as_mut(), &mut signal_rx, &mut sink).await?;

    match outcome {
        DriveOutcome::Finished(result) => {
            let verdict = match result.percentage() {
                Some(p) if p >= ctx.config.pass_threshold => "PASS",
                _ => "FAIL",
            };
            let percent = result
                .percentage()
                .map(|p| format!("{:.1}%", p * 100.0))
                .unwrap_or_else(|| "-".to_string());
            println!("Submitted. Thank you, {}.", result.student_name);
            println!("  Student ID: {}", result.student_id);
            println!(
                "  Score:      {}/{} ({percent}) {verdict}",
                result.score, result.total_possible_score
            );
            println!("  Violations: {}", result.violation_count);
            if sink.failures() > 0 {
                eprintln!("Warning: the result could not be saved; see the log above.");
            }
        }
        DriveOutcome::Abandoned { answered, total } => {
            println!("Input ended before submission ({answered}/{total} answered). Nothing was recorded.");
        }
    }

    Ok(())
}

fn find_exam(exams: &[Exam], args: &TakeArgs) -> Result<Exam, JoinError> {
    let exam = match &args.link {
        Some(link) => {
            let exam = resolve_deep_link(exams, link)?;
            // A link only selects the exam; the token is still required.
            join(exams, &JoinRequest::new(exam.id.clone(), args.token.clone()))?
        }
        None => join(
            exams,
            &JoinRequest::new(args.exam.clone().unwrap_or_default(), args.token.clone()),
        )?,
    };
    Ok(exam.clone())
}
