//! Interactive terminal attempts.
//!
//! Lines starting with `:` are commands; anything else answers the question
//! on screen, interpreted according to its type.

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use exampro_core::model::{AnswerValue, Question, QuestionBody, Verdict};

use crate::events::{AttemptEvent, EventSource, Notice};

pub const HELP: &str = "\
Commands:
  :n, :next        next question
  :p, :prev        previous question
  :g <number>      go to question <number>
  :show            show the current question again
  :submit          finish and submit
  :help            this text
Answers:
  choice           option number or option text (multi-choice toggles)
  true/false       true, false, agree, disagree
  matching         left = right
  short answer     the answer text";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Event(AttemptEvent),
    /// Ask for confirmation, then submit.
    Submit,
    Show,
    Help,
}

/// Interpret one line against the question on screen.
pub fn parse_input(line: &str, current: Option<&Question>) -> Result<ConsoleCommand, String> {
    let input = line.trim();

    if let Some(cmd) = input.strip_prefix(':') {
        let mut parts = cmd.split_whitespace();
        return match parts.next().unwrap_or_default() {
            "n" | "next" => Ok(ConsoleCommand::Event(AttemptEvent::Next)),
            "p" | "prev" | "previous" => Ok(ConsoleCommand::Event(AttemptEvent::Previous)),
            "g" | "goto" => {
                let number = parts
                    .next()
                    .and_then(|s| s.parse::<usize>().ok())
                    .filter(|n| *n >= 1)
                    .ok_or("usage: :g <question number>")?;
                Ok(ConsoleCommand::Event(AttemptEvent::Goto { index: number - 1 }))
            }
            "submit" => Ok(ConsoleCommand::Submit),
            "s" | "show" => Ok(ConsoleCommand::Show),
            "h" | "help" => Ok(ConsoleCommand::Help),
            other => Err(format!("unknown command :{other} (type :help)")),
        };
    }

    let question = current.ok_or("no question on screen")?;
    if input.is_empty() {
        return Err("empty answer ignored".to_string());
    }

    let id = question.id.clone();
    let event = match &question.body {
        QuestionBody::SingleChoice { options, .. } => AttemptEvent::Answer {
            question: id,
            value: AnswerValue::text(pick_option(options, input)?),
        },
        QuestionBody::ComplexChoice { options, .. } => AttemptEvent::Toggle {
            question: id,
            option: pick_option(options, input)?,
        },
        QuestionBody::ShortAnswer { .. } => AttemptEvent::Answer {
            question: id,
            value: AnswerValue::text(input),
        },
        QuestionBody::TrueFalse { .. } | QuestionBody::AgreeDisagree { .. } => {
            let verdict: Verdict = input.parse()?;
            AttemptEvent::Answer {
                question: id,
                value: AnswerValue::text(verdict.as_str()),
            }
        }
        QuestionBody::Matching { matching_pairs } => {
            let (left, right) = input.split_once('=').ok_or("type a pair as: left = right")?;
            let (left, right) = (left.trim(), right.trim());
            if !matching_pairs.iter().any(|p| p.left == left) {
                return Err(format!("nothing to match called '{left}'"));
            }
            AttemptEvent::Pair {
                question: id,
                left: left.to_string(),
                right: right.to_string(),
            }
        }
    };
    Ok(ConsoleCommand::Event(event))
}

/// Accept a 1-based option number or the exact option text.
fn pick_option(options: &[String], input: &str) -> Result<String, String> {
    if let Ok(n) = input.parse::<usize>() {
        if (1..=options.len()).contains(&n) {
            return Ok(options[n - 1].clone());
        }
    }
    options
        .iter()
        .find(|o| o.as_str() == input)
        .cloned()
        .ok_or_else(|| format!("'{input}' is not an option; type its number or text"))
}

/// Text shown for a question.
pub fn render_question(question: &Question) -> String {
    let mut out = format!("\n[{}] {}", question.kind(), question.prompt);
    match &question.body {
        QuestionBody::SingleChoice { options, .. } | QuestionBody::ComplexChoice { options, .. } => {
            for (i, option) in options.iter().enumerate() {
                out.push_str(&format!("\n  {}) {}", i + 1, option));
            }
        }
        QuestionBody::TrueFalse { .. } => out.push_str("\n  (true / false)"),
        QuestionBody::AgreeDisagree { .. } => out.push_str("\n  (agree / disagree)"),
        QuestionBody::ShortAnswer { .. } => out.push_str("\n  (type your answer)"),
        QuestionBody::Matching { matching_pairs } => {
            let mut rights: Vec<&str> = matching_pairs.iter().map(|p| p.right.as_str()).collect();
            rights.sort_unstable();
            for pair in matching_pairs {
                out.push_str(&format!("\n  {} = ?", pair.left));
            }
            out.push_str(&format!("\n  choices: {}", rights.join(", ")));
        }
    }
    out
}

/// Reads answers and commands line by line.
pub struct ConsoleSource<R, W> {
    lines: Lines<R>,
    out: W,
    shown: Option<String>,
    awaiting_confirm: bool,
}

impl ConsoleSource<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleSource<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
            shown: None,
            awaiting_confirm: false,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<R, W> EventSource for ConsoleSource<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_event(&mut self, current: Option<&Question>) -> Result<Option<AttemptEvent>> {
        loop {
            if self.awaiting_confirm {
                let Some(line) = self.lines.next_line().await? else {
                    return Ok(None);
                };
                self.awaiting_confirm = false;
                let confirm = matches!(line.trim().to_lowercase().as_str(), "y" | "yes");
                return Ok(Some(AttemptEvent::Submit { confirm }));
            }

            if let Some(question) = current {
                if self.shown.as_deref() != Some(question.id.as_str()) {
                    self.say(&render_question(question)).await?;
                    self.shown = Some(question.id.clone());
                }
            }

            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            match parse_input(&line, current) {
                Ok(ConsoleCommand::Event(event)) => return Ok(Some(event)),
                Ok(ConsoleCommand::Submit) => {
                    self.awaiting_confirm = true;
                    self.say("Submit your answers now? [y/N]").await?;
                }
                Ok(ConsoleCommand::Show) => self.shown = None,
                Ok(ConsoleCommand::Help) => self.say(HELP).await?,
                Err(message) => self.say(&message).await?,
            }
        }
    }

    async fn notify(&mut self, notice: Notice) -> Result<()> {
        let text = match notice {
            Notice::CloseWarning => {
                "An exam is in progress. Closing now discards your answers; type :submit to finish."
                    .to_string()
            }
            Notice::ViolationRecorded { count } => {
                format!("Warning: you left the exam. Departures recorded: {count}")
            }
            Notice::Rejected(reason) => format!("Not accepted: {reason}"),
            Notice::SubmitDeclined => "Submission cancelled.".to_string(),
        };
        self.say(&text).await
    }
}
