//! The two persisted collections and the operations that keep them in step.

use serde::{Deserialize, Serialize};

use crate::authoring::ensure_editable;
use crate::error::AuthoringError;
use crate::model::{Exam, StudentResult};
use crate::traits::{ExamStore, ResultSink};

/// All exams and all results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub results: Vec<StudentResult>,
}

impl Catalog {
    pub fn new(exams: Vec<Exam>, results: Vec<StudentResult>) -> Self {
        Self { exams, results }
    }

    pub fn find_exam(&self, exam_id: &str) -> Option<&Exam> {
        self.exams.iter().find(|e| e.id == exam_id)
    }

    /// Insert a new exam at the front, or replace the one with the same id.
    ///
    /// Replacing is refused once the stored exam has results.
    pub fn upsert_exam(&mut self, exam: Exam) -> Result<(), AuthoringError> {
        match self.exams.iter_mut().find(|e| e.id == exam.id) {
            Some(existing) => {
                ensure_editable(existing)?;
                *existing = exam;
            }
            None => self.exams.insert(0, exam),
        }
        Ok(())
    }

    /// Remove an exam. Its results stay so reports still show them.
    pub fn delete_exam(&mut self, exam_id: &str) -> Result<Exam, AuthoringError> {
        let pos = self
            .exams
            .iter()
            .position(|e| e.id == exam_id)
            .ok_or_else(|| AuthoringError::ExamNotFound(exam_id.to_string()))?;
        Ok(self.exams.remove(pos))
    }

    /// Append a result and bump its exam's attempt counter.
    pub fn record_result(&mut self, result: StudentResult) {
        match self.exams.iter_mut().find(|e| e.id == result.exam_id) {
            Some(exam) => exam.total_results += 1,
            None => tracing::warn!(exam = %result.exam_id, "result recorded for unknown exam"),
        }
        self.results.push(result);
    }

    /// Results of one exam, oldest first.
    pub fn results_for<'a>(&'a self, exam_id: &'a str) -> impl Iterator<Item = &'a StudentResult> + 'a {
        self.results.iter().filter(move |r| r.exam_id == exam_id)
    }
}

/// Hands finished results to a store: load, record, save.
///
/// Failures are logged and dropped; the session never sees them.
pub struct StoreSink<'a> {
    store: &'a dyn ExamStore,
    failures: usize,
}

impl<'a> StoreSink<'a> {
    pub fn new(store: &'a dyn ExamStore) -> Self {
        Self { store, failures: 0 }
    }

    /// Hand-offs that did not reach the store.
    pub fn failures(&self) -> usize {
        self.failures
    }

    fn persist(&self, result: &StudentResult) -> anyhow::Result<()> {
        let mut catalog = self.store.load()?;
        catalog.record_result(result.clone());
        self.store.save(&catalog)
    }
}

impl ResultSink for StoreSink<'_> {
    fn accept(&mut self, result: &StudentResult) {
        match self.persist(result) {
            Ok(()) => tracing::info!(
                store = self.store.name(),
                result = %result.id,
                "result saved"
            ),
            Err(e) => {
                self.failures += 1;
                tracing::error!(store = self.store.name(), "failed to save result {}: {e:#}", result.id);
            }
        }
    }
}
