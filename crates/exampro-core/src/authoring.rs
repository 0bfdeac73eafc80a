//! Teacher-side rules for building an exam.
//!
//! Questions can only be changed while no attempt has been recorded, and an
//! exam holds at most [`AuthoringPolicy::max_questions`] questions.

use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::error::AuthoringError;
use crate::model::{Exam, Question, QuestionBody};

/// Limits applied while authoring.
#[derive(Debug, Clone)]
pub struct AuthoringPolicy {
    /// Maximum number of questions in one exam.
    pub max_questions: usize,
    /// Number of digits in a generated access token.
    pub token_length: usize,
}

impl Default for AuthoringPolicy {
    fn default() -> Self {
        Self {
            max_questions: 500,
            token_length: 4,
        }
    }
}

/// A new collision-resistant identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A numeric access token of `len` digits without a leading zero.
pub fn generate_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    let len = len.max(1);
    let mut token = String::with_capacity(len);
    token.push(char::from(b'1' + rng.gen_range(0..9u8)));
    for _ in 1..len {
        token.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    token
}

/// Student id used when the student did not supply one.
pub fn generate_student_id(prefix: &str) -> String {
    let n: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{prefix}{n}")
}

/// Start an empty exam with a fresh id and token.
pub fn new_exam(title: impl Into<String>, policy: &AuthoringPolicy) -> Exam {
    Exam {
        id: generate_id(),
        title: title.into(),
        description: String::new(),
        token: generate_token(policy.token_length),
        questions: Vec::new(),
        created_at: Utc::now(),
        total_results: 0,
    }
}

/// Refuse edits once results exist.
pub fn ensure_editable(exam: &Exam) -> Result<(), AuthoringError> {
    if exam.is_locked() {
        return Err(AuthoringError::Locked {
            exam_id: exam.id.clone(),
        });
    }
    Ok(())
}

/// Append a question, respecting the capacity limit.
pub fn add_question(
    exam: &mut Exam,
    question: Question,
    policy: &AuthoringPolicy,
) -> Result<(), AuthoringError> {
    ensure_editable(exam)?;
    if exam.questions.len() >= policy.max_questions {
        return Err(AuthoringError::CapacityExceeded {
            max: policy.max_questions,
        });
    }
    exam.questions.push(question);
    Ok(())
}

/// Replace the question with the same id.
pub fn update_question(exam: &mut Exam, question: Question) -> Result<(), AuthoringError> {
    ensure_editable(exam)?;
    let slot = exam
        .questions
        .iter_mut()
        .find(|q| q.id == question.id)
        .ok_or_else(|| AuthoringError::QuestionNotFound(question.id.clone()))?;
    *slot = question;
    Ok(())
}

pub fn remove_question(exam: &mut Exam, question_id: &str) -> Result<Question, AuthoringError> {
    ensure_editable(exam)?;
    let pos = exam
        .questions
        .iter()
        .position(|q| q.id == question_id)
        .ok_or_else(|| AuthoringError::QuestionNotFound(question_id.to_string()))?;
    Ok(exam.questions.remove(pos))
}

/// A warning from exam validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn exam(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }

    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Check an exam for authoring mistakes that would make questions
/// ungradable or confusing. Nothing here blocks publishing.
pub fn validate_exam(exam: &Exam, policy: &AuthoringPolicy) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.title.trim().is_empty() {
        warnings.push(ValidationWarning::exam("title is empty"));
    }
    if exam.token.is_empty() {
        warnings.push(ValidationWarning::exam("token is empty"));
    }
    if exam.questions.is_empty() {
        warnings.push(ValidationWarning::exam("exam has no questions"));
    }
    if exam.questions.len() > policy.max_questions {
        warnings.push(ValidationWarning::exam(format!(
            "exam has {} questions, more than the maximum of {}",
            exam.questions.len(),
            policy.max_questions
        )));
    }

    let mut seen_ids = HashSet::new();
    for q in &exam.questions {
        if !seen_ids.insert(q.id.as_str()) {
            warnings.push(ValidationWarning::question(&q.id, format!("duplicate question ID: {}", q.id)));
        }
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::question(&q.id, "prompt is empty"));
        }
        if !q.weight.is_finite() || q.weight < 0.0 {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!("weight {} is negative or not a number", q.weight),
            ));
        }
        warnings.extend(
            body_warnings(&q.body)
                .into_iter()
                .map(|m| ValidationWarning::question(&q.id, m)),
        );
    }

    warnings
}

fn body_warnings(body: &QuestionBody) -> Vec<String> {
    let mut out = Vec::new();
    match body {
        QuestionBody::SingleChoice {
            options,
            correct_answer,
        } => {
            if options.len() < 2 {
                out.push("choice question needs at least two options".to_string());
            }
            if !options.contains(correct_answer) {
                out.push(format!("correct answer '{correct_answer}' is not one of the options"));
            }
        }
        QuestionBody::ComplexChoice {
            options,
            correct_answer,
        } => {
            if options.len() < 2 {
                out.push("choice question needs at least two options".to_string());
            }
            if correct_answer.is_empty() {
                out.push("no correct options selected".to_string());
            }
            let mut seen = HashSet::new();
            for answer in correct_answer {
                if !options.contains(answer) {
                    out.push(format!("correct answer '{answer}' is not one of the options"));
                }
                if !seen.insert(answer.as_str()) {
                    out.push(format!("duplicate correct option: {answer}"));
                }
            }
        }
        QuestionBody::ShortAnswer { correct_answer } => {
            if correct_answer.is_empty() {
                out.push("correct answer is empty".to_string());
            }
        }
        QuestionBody::Matching { matching_pairs } => {
            if matching_pairs.is_empty() {
                out.push("matching question has no pairs".to_string());
            }
            let mut lefts = HashSet::new();
            for pair in matching_pairs {
                if !lefts.insert(pair.left.as_str()) {
                    out.push(format!("duplicate left item: {}", pair.left));
                }
            }
        }
        QuestionBody::TrueFalse { .. } | QuestionBody::AgreeDisagree { .. } => {}
    }
    out
}
