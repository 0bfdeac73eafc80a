//! Results report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use exampro_core::catalog::Catalog;
use exampro_core::statistics::ExamStatistics;

/// Every result in scope, joined with its exam, plus per-exam statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub pass_threshold: f64,
    /// Exam the report was limited to, if any.
    #[serde(default)]
    pub exam_filter: Option<String>,
    /// Newest first.
    pub rows: Vec<ResultRow>,
    /// One entry per exam that still exists and is in scope.
    pub statistics: Vec<ExamStatistics>,
}

/// One result line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub result_id: String,
    pub exam_id: String,
    /// `None` when the exam has been deleted.
    pub exam_title: Option<String>,
    pub student_name: String,
    pub student_id: String,
    pub score: f64,
    pub total_possible_score: f64,
    pub percentage: Option<f64>,
    pub passed: bool,
    pub violation_count: u32,
    pub timestamp: DateTime<Utc>,
}

impl ResultsReport {
    /// Build a report over `catalog`, optionally limited to one exam.
    pub fn build(catalog: &Catalog, exam_filter: Option<&str>, pass_threshold: f64) -> Self {
        let in_scope = |exam_id: &str| exam_filter.map_or(true, |f| f == exam_id);

        let mut rows: Vec<ResultRow> = catalog
            .results
            .iter()
            .filter(|r| in_scope(&r.exam_id))
            .map(|r| {
                let percentage = r.percentage();
                ResultRow {
                    result_id: r.id.clone(),
                    exam_id: r.exam_id.clone(),
                    exam_title: catalog.find_exam(&r.exam_id).map(|e| e.title.clone()),
                    student_name: r.student_name.clone(),
                    student_id: r.student_id.clone(),
                    score: r.score,
                    total_possible_score: r.total_possible_score,
                    percentage,
                    passed: percentage.is_some_and(|p| p >= pass_threshold),
                    violation_count: r.violation_count,
                    timestamp: r.timestamp,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let statistics = catalog
            .exams
            .iter()
            .filter(|e| in_scope(&e.id))
            .map(|e| ExamStatistics::compute(e, &catalog.results, pass_threshold))
            .collect();

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            pass_threshold,
            exam_filter: exam_filter.map(str::to_string),
            rows,
            statistics,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ResultsReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
