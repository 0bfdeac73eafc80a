//! exampro-core: Question model, scoring engine, and exam-session state machine.
//!
//! This crate defines the exam and result records, the answer store for one
//! attempt, the deterministic scoring rules, and the lifecycle of an attempt.
//! Persistence and the runtime environment are reached only through the ports
//! in [`traits`].

pub mod answers;
pub mod authoring;
pub mod catalog;
pub mod error;
pub mod join;
pub mod model;
pub mod parser;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod traits;
