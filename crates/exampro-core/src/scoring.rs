//! Deterministic scoring of a frozen answer set.
//!
//! Every question contributes its weight to the maximum; a question awards
//! its full weight when the submitted value satisfies the variant's rule and
//! nothing otherwise. There is no partial credit, matching included.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::answers::AnswerSnapshot;
use crate::model::{AnswerValue, MatchingPair, Question, QuestionBody};

/// Totals of one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_score: f64,
    pub max_possible: f64,
}

impl ScoreSummary {
    /// Score as a fraction of the maximum; `None` when nothing was gradable.
    pub fn percentage(&self) -> Option<f64> {
        if self.max_possible > 0.0 {
            Some(self.total_score / self.max_possible)
        } else {
            None
        }
    }

    /// An exam with no weight never passes.
    pub fn passed(&self, threshold: f64) -> bool {
        self.percentage().is_some_and(|p| p >= threshold)
    }
}

/// How a single question was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Correct,
    Incorrect,
    Unanswered,
}

/// Per-question line of a grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: String,
    pub weight: f64,
    pub awarded: f64,
    pub status: OutcomeStatus,
}

/// Full grading: summary plus one outcome per question, in exam order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grading {
    pub summary: ScoreSummary,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Score an answer snapshot against a question sequence.
pub fn score(questions: &[Question], answers: &AnswerSnapshot) -> ScoreSummary {
    grade(questions, answers).summary
}

/// Grade every question once, accumulating the maximum regardless of
/// whether the question was answered.
pub fn grade(questions: &[Question], answers: &AnswerSnapshot) -> Grading {
    let mut summary = ScoreSummary::default();
    let mut outcomes = Vec::with_capacity(questions.len());

    for question in questions {
        summary.max_possible += question.weight;

        let status = match answers.get(&question.id) {
            None => OutcomeStatus::Unanswered,
            Some(value) if is_correct(&question.body, value) => OutcomeStatus::Correct,
            Some(_) => OutcomeStatus::Incorrect,
        };

        let awarded = if status == OutcomeStatus::Correct {
            question.weight
        } else {
            0.0
        };
        summary.total_score += awarded;

        outcomes.push(QuestionOutcome {
            question_id: question.id.clone(),
            weight: question.weight,
            awarded,
            status,
        });
    }

    tracing::debug!(
        total = summary.total_score,
        max = summary.max_possible,
        "graded {} questions",
        questions.len()
    );

    Grading { summary, outcomes }
}

/// Whether a submitted value satisfies a question's rule. A value of the
/// wrong shape is simply not correct.
pub fn is_correct(body: &QuestionBody, value: &AnswerValue) -> bool {
    match (body, value) {
        (QuestionBody::SingleChoice { correct_answer, .. }, AnswerValue::Text(given))
        | (QuestionBody::ShortAnswer { correct_answer }, AnswerValue::Text(given)) => {
            given == correct_answer
        }
        (QuestionBody::TrueFalse { correct_answer }, AnswerValue::Text(given))
        | (QuestionBody::AgreeDisagree { correct_answer }, AnswerValue::Text(given)) => {
            given == correct_answer.as_str()
        }
        (QuestionBody::ComplexChoice { correct_answer, .. }, AnswerValue::Selection(given)) => {
            selection_matches(correct_answer, given)
        }
        (QuestionBody::Matching { matching_pairs }, AnswerValue::Pairs(given)) => {
            pairs_match(matching_pairs, given)
        }
        _ => false,
    }
}

/// Equal cardinality and every submitted element in the correct set, which
/// together with the set comparison rejects duplicates standing in for a
/// missing option.
fn selection_matches(correct: &[String], given: &[String]) -> bool {
    if correct.len() != given.len() {
        return false;
    }
    let correct: BTreeSet<&str> = correct.iter().map(String::as_str).collect();
    let given: BTreeSet<&str> = given.iter().map(String::as_str).collect();
    correct == given
}

/// All-or-nothing: every canonical left key must map to its right value,
/// and an empty submission never scores.
fn pairs_match(pairs: &[MatchingPair], given: &BTreeMap<String, String>) -> bool {
    if given.is_empty() {
        return false;
    }
    let canonical: BTreeMap<&str, &str> = pairs
        .iter()
        .map(|p| (p.left.as_str(), p.right.as_str()))
        .collect();
    canonical
        .iter()
        .all(|(left, right)| given.get(*left).map(String::as_str) == Some(*right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerStore;
    use crate::model::Verdict;

    fn single(id: &str, weight: f64, correct: &str) -> Question {
        Question::new(
            id,
            "pick one",
            weight,
            QuestionBody::SingleChoice {
                options: vec!["A".into(), "B".into()],
                correct_answer: correct.into(),
            },
        )
    }

    fn complex(id: &str, correct: &[&str]) -> Question {
        Question::new(
            id,
            "pick many",
            2.0,
            QuestionBody::ComplexChoice {
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: correct.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn matching(id: &str) -> Question {
        Question::new(
            id,
            "match",
            3.0,
            QuestionBody::Matching {
                matching_pairs: vec![
                    MatchingPair {
                        id: "p1".into(),
                        left: "x".into(),
                        right: "1".into(),
                    },
                    MatchingPair {
                        id: "p2".into(),
                        left: "y".into(),
                        right: "2".into(),
                    },
                ],
            },
        )
    }

    fn answers(entries: &[(&str, AnswerValue)]) -> AnswerSnapshot {
        let mut store = AnswerStore::new();
        for (id, value) in entries {
            store.set(*id, value.clone());
        }
        store.snapshot()
    }

    fn summary(total: f64, max: f64) -> ScoreSummary {
        ScoreSummary {
            total_score: total,
            max_possible: max,
        }
    }

    #[test]
    fn single_choice_exact_match() {
        let qs = vec![single("q1", 5.0, "B")];
        assert_eq!(score(&qs, &answers(&[("q1", AnswerValue::text("B"))])), summary(5.0, 5.0));
        assert_eq!(score(&qs, &answers(&[("q1", AnswerValue::text("A"))])), summary(0.0, 5.0));
        assert_eq!(score(&qs, &answers(&[])), summary(0.0, 5.0));
    }

    #[test]
    fn short_answer_is_case_sensitive_and_untrimmed() {
        let qs = vec![Question::new(
            "s",
            "capital",
            1.0,
            QuestionBody::ShortAnswer {
                correct_answer: "Jakarta".into(),
            },
        )];
        assert_eq!(score(&qs, &answers(&[("s", AnswerValue::text("Jakarta"))])).total_score, 1.0);
        assert_eq!(score(&qs, &answers(&[("s", AnswerValue::text("jakarta"))])).total_score, 0.0);
        assert_eq!(score(&qs, &answers(&[("s", AnswerValue::text("Jakarta "))])).total_score, 0.0);
    }

    #[test]
    fn complex_choice_is_set_equality() {
        let qs = vec![complex("c", &["A", "C"])];
        let full = |v: AnswerValue| score(&qs, &answers(&[("c", v)])).total_score;
        assert_eq!(full(AnswerValue::selection(["C", "A"])), 2.0);
        assert_eq!(full(AnswerValue::selection(["A"])), 0.0);
        assert_eq!(full(AnswerValue::selection(["A", "C", "D"])), 0.0);
        assert_eq!(full(AnswerValue::selection(["A", "A"])), 0.0);
        assert_eq!(full(AnswerValue::text("A")), 0.0);
    }

    #[test]
    fn matching_is_all_or_nothing() {
        let qs = vec![matching("m")];
        let full = |v: AnswerValue| score(&qs, &answers(&[("m", v)])).total_score;
        assert_eq!(full(AnswerValue::pairs([("x", "1"), ("y", "2")])), 3.0);
        assert_eq!(full(AnswerValue::pairs([("x", "1")])), 0.0);
        assert_eq!(full(AnswerValue::pairs(Vec::<(String, String)>::new())), 0.0);
        assert_eq!(full(AnswerValue::pairs([("x", "2"), ("y", "1")])), 0.0);
        assert_eq!(full(AnswerValue::selection(["1", "2"])), 0.0);
    }

    #[test]
    fn verdicts_require_exact_strings() {
        let qs = vec![
            Question::new(
                "t",
                "true?",
                1.0,
                QuestionBody::TrueFalse {
                    correct_answer: Verdict::True,
                },
            ),
            Question::new(
                "a",
                "agree?",
                1.0,
                QuestionBody::AgreeDisagree {
                    correct_answer: Verdict::False,
                },
            ),
        ];
        let ok = answers(&[("t", AnswerValue::text("TRUE")), ("a", AnswerValue::text("FALSE"))]);
        assert_eq!(score(&qs, &ok), summary(2.0, 2.0));

        let wrong = answers(&[("t", AnswerValue::text("true")), ("a", AnswerValue::text("TRUE"))]);
        assert_eq!(score(&qs, &wrong), summary(0.0, 2.0));
    }

    #[test]
    fn empty_exam_has_zero_max_and_no_percentage() {
        let result = score(&[], &answers(&[]));
        assert_eq!(result, summary(0.0, 0.0));
        assert_eq!(result.percentage(), None);
        assert!(!result.passed(0.0));
    }

    #[test]
    fn fractional_and_zero_weights() {
        let qs = vec![single("q1", 0.5, "A"), single("q2", 0.0, "A"), single("q3", 1.25, "B")];
        let all = answers(&[
            ("q1", AnswerValue::text("A")),
            ("q2", AnswerValue::text("A")),
            ("q3", AnswerValue::text("B")),
        ]);
        assert_eq!(score(&qs, &all), summary(1.75, 1.75));
    }

    #[test]
    fn score_never_exceeds_total_weight() {
        let qs = vec![single("q1", 5.0, "B"), complex("c", &["A"]), matching("m")];
        let total: f64 = qs.iter().map(|q| q.weight).sum();
        let snapshots = [
            answers(&[]),
            answers(&[("q1", AnswerValue::text("B"))]),
            answers(&[
                ("q1", AnswerValue::text("B")),
                ("c", AnswerValue::selection(["A"])),
                ("m", AnswerValue::pairs([("x", "1"), ("y", "2")])),
                ("unknown", AnswerValue::text("noise")),
            ]),
        ];
        for snap in &snapshots {
            let s = score(&qs, snap);
            assert_eq!(s.max_possible, total);
            assert!(s.total_score <= s.max_possible);
        }
    }

    #[test]
    fn scoring_is_idempotent() {
        let qs = vec![single("q1", 5.0, "B"), matching("m")];
        let snap = answers(&[("q1", AnswerValue::text("B"))]);
        assert_eq!(grade(&qs, &snap), grade(&qs, &snap));
    }

    #[test]
    fn grade_reports_status_per_question() {
        let qs = vec![single("q1", 1.0, "A"), single("q2", 1.0, "A"), single("q3", 1.0, "A")];
        let snap = answers(&[("q1", AnswerValue::text("A")), ("q2", AnswerValue::text("B"))]);
        let grading = grade(&qs, &snap);
        let statuses: Vec<_> = grading.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                OutcomeStatus::Correct,
                OutcomeStatus::Incorrect,
                OutcomeStatus::Unanswered
            ]
        );
        assert!(grading.summary.passed(0.3));
        assert!(!grading.summary.passed(0.7));
    }
}
