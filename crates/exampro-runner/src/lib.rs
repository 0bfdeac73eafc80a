//! exampro-runner: Drives one exam attempt against a live environment.
//!
//! Merges the student's input stream with environmental signals (window
//! close, visibility loss) and feeds both into an `exampro_core` session
//! until it is submitted or the input ends.

pub mod console;
pub mod driver;
pub mod events;
pub mod lockdown;

pub use driver::{drive, DriveOutcome};
pub use events::{load_script, AttemptEvent, EnvSignal, EventSource, Notice, ScriptedSource};
pub use lockdown::TerminalLockdown;
