//! JSON file store.
//!
//! Keeps the two collections as `exams.json` and `results.json` in one
//! directory. Each file is replaced atomically on save.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use exampro_core::catalog::Catalog;
use exampro_core::traits::ExamStore;

use crate::error::StoreError;

const EXAMS_FILE: &str = "exams.json";
const RESULTS_FILE: &str = "results.json";

/// Store backed by two JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exams_path(&self) -> PathBuf {
        self.dir.join(EXAMS_FILE)
    }

    pub fn results_path(&self) -> PathBuf {
        self.dir.join(RESULTS_FILE)
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(StoreError::NotADirectory(self.dir.clone()));
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

/// Read a collection; a missing file is an empty collection.
fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|source| StoreError::Serde {
        path: path.to_path_buf(),
        source,
    })
}

fn write_collection<T: Serialize>(dir: &Path, path: &Path, items: &[T]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    serde_json::to_writer_pretty(&mut tmp, items).map_err(|source| StoreError::Serde {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(b"\n").map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

impl ExamStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<Catalog> {
        let exams = read_collection(&self.exams_path())?;
        let results = read_collection(&self.results_path())?;
        let catalog = Catalog::new(exams, results);
        tracing::debug!(
            dir = %self.dir.display(),
            exams = catalog.exams.len(),
            results = catalog.results.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        self.ensure_dir()?;
        // Results first: a failure between the two writes must not leave an
        // exam counting a result that was never stored.
        write_collection(&self.dir, &self.results_path(), &catalog.results)?;
        write_collection(&self.dir, &self.exams_path(), &catalog.exams)?;
        tracing::debug!(dir = %self.dir.display(), "saved catalog");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use exampro_core::answers::AnswerStore;
    use exampro_core::model::{AnswerValue, Exam, Question, QuestionBody, StudentResult};

    use super::*;

    fn exam() -> Exam {
        Exam {
            id: "e1".into(),
            title: "Math".into(),
            description: String::new(),
            token: "1234".into(),
            questions: vec![Question::new(
                "q1",
                "2 + 2?",
                1.0,
                QuestionBody::ShortAnswer {
                    correct_answer: "4".into(),
                },
            )],
            created_at: Utc::now(),
            total_results: 0,
        }
    }

    fn result() -> StudentResult {
        let mut answers = AnswerStore::new();
        answers.set("q1", AnswerValue::text("4"));
        StudentResult {
            id: "r1".into(),
            exam_id: "e1".into(),
            student_name: "Ayu".into(),
            student_id: "SIS-1234".into(),
            score: 1.0,
            total_possible_score: 1.0,
            answers: answers.snapshot(),
            timestamp: Utc::now(),
            violation_count: 2,
        }
    }

    #[test]
    fn empty_directory_loads_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));
        let catalog = store.load().unwrap();
        assert!(catalog.exams.is_empty());
        assert!(catalog.results.is_empty());
    }

    #[test]
    fn save_then_load_observes_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        let mut catalog = Catalog::default();
        catalog.upsert_exam(exam()).unwrap();
        catalog.record_result(result());
        store.save(&catalog).unwrap();

        assert!(store.exams_path().exists());
        assert!(store.results_path().exists());
        assert_eq!(store.load().unwrap(), catalog);
    }

    #[test]
    fn files_use_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let mut catalog = Catalog::default();
        catalog.upsert_exam(exam()).unwrap();
        catalog.record_result(result());
        store.save(&catalog).unwrap();

        let results = std::fs::read_to_string(store.results_path()).unwrap();
        assert!(results.contains("\"examId\""));
        assert!(results.contains("\"totalPossibleScore\""));
        let exams = std::fs::read_to_string(store.exams_path()).unwrap();
        assert!(exams.contains("\"totalResults\": 1"));
        assert!(exams.contains("\"SHORT_ANSWER\""));
    }

    #[test]
    fn failed_results_write_leaves_exams_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        // A directory where results.json should go makes that write fail.
        std::fs::create_dir(store.results_path()).unwrap();
        std::fs::write(store.results_path().join("keep"), "x").unwrap();

        let mut catalog = Catalog::default();
        catalog.upsert_exam(exam()).unwrap();
        catalog.record_result(result());
        assert!(store.save(&catalog).is_err());
        assert!(!store.exams_path().exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(EXAMS_FILE), "{not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Serde { .. })
        ));
    }

    #[test]
    fn path_that_is_a_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").unwrap();
        let store = JsonFileStore::new(&file);
        let err = store.save(&Catalog::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotADirectory(_))
        ));
    }
}
