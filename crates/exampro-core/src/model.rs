//! Core data model types for exampro.
//!
//! Questions are a sum type over the six supported variants; each variant
//! carries its own strongly-typed correct answer. Exams, results, and the
//! answer values a student submits are the records persisted by the store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answers::AnswerSnapshot;

/// One gradable unit of an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier, stable for the lifetime of the exam.
    pub id: String,
    /// Display text.
    #[serde(default)]
    pub prompt: String,
    /// Contribution to the maximum score. Non-negative, may be fractional.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Variant tag plus the variant's authored fields.
    #[serde(flatten)]
    pub body: QuestionBody,
}

fn default_weight() -> f64 {
    1.0
}

impl Question {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, weight: f64, body: QuestionBody) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            weight,
            body,
        }
    }

    pub fn kind(&self) -> QuestionKind {
        self.body.kind()
    }

    /// Options shown to the student, if the variant has any.
    pub fn options(&self) -> &[String] {
        match &self.body {
            QuestionBody::SingleChoice { options, .. } | QuestionBody::ComplexChoice { options, .. } => {
                options
            }
            _ => &[],
        }
    }
}

/// The six question variants with their correct-answer shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionBody {
    /// Exactly one option is correct.
    #[serde(rename_all = "camelCase")]
    SingleChoice {
        options: Vec<String>,
        correct_answer: String,
    },
    /// A set of options is correct; the submitted set must equal it.
    #[serde(rename_all = "camelCase")]
    ComplexChoice {
        options: Vec<String>,
        correct_answer: Vec<String>,
    },
    /// Free text compared exactly.
    #[serde(rename_all = "camelCase")]
    ShortAnswer { correct_answer: String },
    #[serde(rename_all = "camelCase")]
    TrueFalse { correct_answer: Verdict },
    #[serde(rename_all = "camelCase")]
    AgreeDisagree { correct_answer: Verdict },
    /// Left items matched to right items; the pairs define the key.
    #[serde(rename_all = "camelCase")]
    Matching { matching_pairs: Vec<MatchingPair> },
}

impl QuestionBody {
    pub fn kind(&self) -> QuestionKind {
        match self {
            QuestionBody::SingleChoice { .. } => QuestionKind::SingleChoice,
            QuestionBody::ComplexChoice { .. } => QuestionKind::ComplexChoice,
            QuestionBody::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            QuestionBody::TrueFalse { .. } => QuestionKind::TrueFalse,
            QuestionBody::AgreeDisagree { .. } => QuestionKind::AgreeDisagree,
            QuestionBody::Matching { .. } => QuestionKind::Matching,
        }
    }
}

/// A left/right pair of a matching question. `left` is the scoring key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub id: String,
    pub left: String,
    pub right: String,
}

/// The variant tag on its own, for display and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    SingleChoice,
    ComplexChoice,
    ShortAnswer,
    Matching,
    TrueFalse,
    AgreeDisagree,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleChoice => write!(f, "SINGLE_CHOICE"),
            QuestionKind::ComplexChoice => write!(f, "COMPLEX_CHOICE"),
            QuestionKind::ShortAnswer => write!(f, "SHORT_ANSWER"),
            QuestionKind::Matching => write!(f, "MATCHING"),
            QuestionKind::TrueFalse => write!(f, "TRUE_FALSE"),
            QuestionKind::AgreeDisagree => write!(f, "AGREE_DISAGREE"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "SINGLE_CHOICE" => Ok(QuestionKind::SingleChoice),
            "COMPLEX_CHOICE" => Ok(QuestionKind::ComplexChoice),
            "SHORT_ANSWER" => Ok(QuestionKind::ShortAnswer),
            "MATCHING" => Ok(QuestionKind::Matching),
            "TRUE_FALSE" => Ok(QuestionKind::TrueFalse),
            "AGREE_DISAGREE" => Ok(QuestionKind::AgreeDisagree),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Correct answer of a TRUE_FALSE or AGREE_DISAGREE question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
}

impl Verdict {
    /// The wire string a submitted answer must equal.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::True => "TRUE",
            Verdict::False => "FALSE",
        }
    }

    /// Human label; AGREE_DISAGREE shows the same values as agree/disagree.
    pub fn label(self, kind: QuestionKind) -> &'static str {
        match (kind, self) {
            (QuestionKind::AgreeDisagree, Verdict::True) => "agree",
            (QuestionKind::AgreeDisagree, Verdict::False) => "disagree",
            (_, Verdict::True) => "true",
            (_, Verdict::False) => "false",
        }
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "t" | "agree" | "yes" => Ok(Verdict::True),
            "false" | "f" | "disagree" | "no" => Ok(Verdict::False),
            other => Err(format!("expected true/false, got: {other}")),
        }
    }
}

/// A value the student submitted for one question.
///
/// No shape checking happens when a value is stored; a value whose shape
/// does not fit its question simply never matches during scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// SINGLE_CHOICE, SHORT_ANSWER, TRUE_FALSE, AGREE_DISAGREE.
    Text(String),
    /// COMPLEX_CHOICE.
    Selection(Vec<String>),
    /// MATCHING: left value to chosen right value.
    Pairs(BTreeMap<String, String>),
    /// Anything else found in stored data.
    Other(serde_json::Value),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn selection<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Selection(values.into_iter().map(Into::into).collect())
    }

    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        AnswerValue::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Whether the value carries any content, for navigation markers.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(s) => s.is_empty(),
            AnswerValue::Selection(v) => v.is_empty(),
            AnswerValue::Pairs(m) => m.is_empty(),
            AnswerValue::Other(v) => v.is_null(),
        }
    }
}

/// An ordered sequence of questions published under an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Shared access token students must present to join.
    pub token: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    /// Completed attempts recorded against this exam.
    #[serde(default)]
    pub total_results: u32,
}

impl Exam {
    /// Sum of all question weights, i.e. the maximum score.
    pub fn total_weight(&self) -> f64 {
        self.questions.iter().map(|q| q.weight).sum()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Once an attempt has been recorded the question set must stay fixed.
    pub fn is_locked(&self) -> bool {
        self.total_results > 0
    }
}

/// The immutable record of one completed attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub id: String,
    pub exam_id: String,
    pub student_name: String,
    pub student_id: String,
    pub score: f64,
    pub total_possible_score: f64,
    pub answers: AnswerSnapshot,
    pub timestamp: DateTime<Utc>,
    /// Departures recorded during the attempt. Advisory only.
    #[serde(default)]
    pub violation_count: u32,
}

impl StudentResult {
    /// Score as a fraction of the maximum, or `None` for an exam with no weight.
    pub fn percentage(&self) -> Option<f64> {
        if self.total_possible_score > 0.0 {
            Some(self.score / self.total_possible_score)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_display_and_parse() {
        assert_eq!(QuestionKind::ComplexChoice.to_string(), "COMPLEX_CHOICE");
        assert_eq!(
            "single_choice".parse::<QuestionKind>().unwrap(),
            QuestionKind::SingleChoice
        );
        assert_eq!(
            "agree-disagree".parse::<QuestionKind>().unwrap(),
            QuestionKind::AgreeDisagree
        );
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn verdict_labels_follow_kind() {
        assert_eq!(Verdict::True.label(QuestionKind::TrueFalse), "true");
        assert_eq!(Verdict::False.label(QuestionKind::AgreeDisagree), "disagree");
        assert_eq!("Agree".parse::<Verdict>().unwrap(), Verdict::True);
        assert_eq!(Verdict::False.as_str(), "FALSE");
    }

    #[test]
    fn question_uses_external_field_names() {
        let json = r#"{
            "id": "q1",
            "type": "SINGLE_CHOICE",
            "prompt": "Pick B",
            "options": ["A", "B"],
            "correctAnswer": "B",
            "weight": 5
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind(), QuestionKind::SingleChoice);
        assert_eq!(q.weight, 5.0);
        assert_eq!(q.options(), &["A".to_string(), "B".to_string()]);

        let back = serde_json::to_value(&q).unwrap();
        assert_eq!(back["type"], "SINGLE_CHOICE");
        assert_eq!(back["correctAnswer"], "B");
    }

    #[test]
    fn matching_question_reads_pairs() {
        let json = r#"{
            "id": "m1",
            "type": "MATCHING",
            "prompt": "Match",
            "weight": 2,
            "matchingPairs": [
                {"id": "p1", "left": "x", "right": "1"},
                {"id": "p2", "left": "y", "right": "2"}
            ]
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        match q.body {
            QuestionBody::Matching { matching_pairs } => assert_eq!(matching_pairs.len(), 2),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn answer_value_shapes_from_json() {
        let text: AnswerValue = serde_json::from_str(r#""TRUE""#).unwrap();
        assert_eq!(text, AnswerValue::text("TRUE"));

        let sel: AnswerValue = serde_json::from_str(r#"["A","C"]"#).unwrap();
        assert_eq!(sel, AnswerValue::selection(["A", "C"]));

        let pairs: AnswerValue = serde_json::from_str(r#"{"x":"1"}"#).unwrap();
        assert_eq!(pairs, AnswerValue::pairs([("x", "1")]));

        let other: AnswerValue = serde_json::from_str("42").unwrap();
        assert!(matches!(other, AnswerValue::Other(_)));
    }

    #[test]
    fn result_percentage_guards_zero() {
        let result = StudentResult {
            id: "r".into(),
            exam_id: "e".into(),
            student_name: "A".into(),
            student_id: "SIS-1000".into(),
            score: 0.0,
            total_possible_score: 0.0,
            answers: AnswerSnapshot::default(),
            timestamp: Utc::now(),
            violation_count: 0,
        };
        assert_eq!(result.percentage(), None);
    }
}
