//! Aggregate statistics over the results of one exam.

use serde::{Deserialize, Serialize};

use crate::model::{Exam, StudentResult};
use crate::scoring::{grade, OutcomeStatus};

/// Summary of every attempt at one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStatistics {
    pub exam_id: String,
    pub title: String,
    /// Number of results counted.
    pub attempts: usize,
    /// Mean percentage over attempts that have one (0.0..=1.0).
    pub mean_percentage: Option<f64>,
    pub min_percentage: Option<f64>,
    pub max_percentage: Option<f64>,
    /// Fraction of attempts at or above the pass threshold.
    pub pass_rate: Option<f64>,
    pub avg_violations: f64,
    pub questions: Vec<QuestionStats>,
}

/// How one question fared across attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub question_id: String,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
}

impl QuestionStats {
    /// Fraction of attempts that answered correctly.
    pub fn correct_rate(&self) -> Option<f64> {
        let total = self.correct + self.incorrect + self.unanswered;
        if total == 0 {
            None
        } else {
            Some(self.correct as f64 / total as f64)
        }
    }
}

impl ExamStatistics {
    /// Compute statistics for `exam` from the results that belong to it.
    ///
    /// Per-question figures re-grade each stored answer snapshot against the
    /// current questions. Results for other exams are ignored.
    pub fn compute(exam: &Exam, results: &[StudentResult], pass_threshold: f64) -> Self {
        let results: Vec<&StudentResult> = results.iter().filter(|r| r.exam_id == exam.id).collect();

        let percentages: Vec<f64> = results.iter().filter_map(|r| r.percentage()).collect();
        let mean_percentage = mean(&percentages);
        let min_percentage = percentages.iter().copied().reduce(f64::min);
        let max_percentage = percentages.iter().copied().reduce(f64::max);
        let pass_rate = if results.is_empty() {
            None
        } else {
            let passed = percentages.iter().filter(|p| **p >= pass_threshold).count();
            Some(passed as f64 / results.len() as f64)
        };

        let avg_violations = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.violation_count as f64).sum::<f64>() / results.len() as f64
        };

        let mut questions: Vec<QuestionStats> = exam
            .questions
            .iter()
            .map(|q| QuestionStats {
                question_id: q.id.clone(),
                correct: 0,
                incorrect: 0,
                unanswered: 0,
            })
            .collect();

        for result in &results {
            let grading = grade(&exam.questions, &result.answers);
            for (stats, outcome) in questions.iter_mut().zip(&grading.outcomes) {
                match outcome.status {
                    OutcomeStatus::Correct => stats.correct += 1,
                    OutcomeStatus::Incorrect => stats.incorrect += 1,
                    OutcomeStatus::Unanswered => stats.unanswered += 1,
                }
            }
        }

        Self {
            exam_id: exam.id.clone(),
            title: exam.title.clone(),
            attempts: results.len(),
            mean_percentage,
            min_percentage,
            max_percentage,
            pass_rate,
            avg_violations,
            questions,
        }
    }

    /// The question answered correctly least often, if any were attempted.
    pub fn hardest_question(&self) -> Option<&QuestionStats> {
        self.questions
            .iter()
            .filter_map(|q| q.correct_rate().map(|rate| (q, rate)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(q, _)| q)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
