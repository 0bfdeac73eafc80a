//! Locating an exam for a student: by id/title plus token, or by deep link.

use crate::error::JoinError;
use crate::model::Exam;

const LINK_PREFIX: &str = "exam/";

/// What a student types into the join form.
#[derive(Debug, Clone, Default)]
pub struct JoinRequest {
    /// Exam id or exact title. May be blank when the token alone is used.
    pub exam: String,
    pub token: String,
}

impl JoinRequest {
    pub fn new(exam: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            exam: exam.into(),
            token: token.into(),
        }
    }
}

/// Find the exam a request refers to and check its token.
///
/// Lookup order: exact id, exact title, then (for a blank identifier) the
/// exam whose token matches. The token must equal the exam's token exactly.
pub fn join<'a>(exams: &'a [Exam], request: &JoinRequest) -> Result<&'a Exam, JoinError> {
    let key = request.exam.trim();

    let found = if key.is_empty() {
        exams.iter().find(|e| e.token == request.token)
    } else {
        exams
            .iter()
            .find(|e| e.id == key)
            .or_else(|| exams.iter().find(|e| e.title == key))
    };

    let exam = found.ok_or_else(|| JoinError::NotFound(key.to_string()))?;

    if exam.token != request.token {
        tracing::debug!(exam = %exam.id, "join rejected: wrong token");
        return Err(JoinError::WrongToken {
            exam_id: exam.id.clone(),
        });
    }

    tracing::debug!(exam = %exam.id, "join accepted");
    Ok(exam)
}

/// The address encoded into an exam's QR code.
pub fn deep_link(exam_id: &str) -> String {
    format!("{LINK_PREFIX}{exam_id}")
}

/// Extract the exam id from `exam/<id>`, `#/exam/<id>`, or a full URL
/// whose fragment is `#/exam/<id>`.
pub fn parse_deep_link(link: &str) -> Result<&str, JoinError> {
    let link = link.trim();
    let tail = if let Some(pos) = link.find("#/") {
        &link[pos + 2..]
    } else {
        link.trim_start_matches('/')
    };

    let id = tail
        .strip_prefix(LINK_PREFIX)
        .map(|id| id.trim_end_matches('/'))
        .filter(|id| !id.is_empty() && !id.contains('/'))
        .ok_or_else(|| JoinError::InvalidLink(link.to_string()))?;
    Ok(id)
}

/// Resolve a deep link to its exam.
pub fn resolve_deep_link<'a>(exams: &'a [Exam], link: &str) -> Result<&'a Exam, JoinError> {
    let id = parse_deep_link(link)?;
    find_exam(exams, id)
}

/// Locate an exam by id.
pub fn find_exam<'a>(exams: &'a [Exam], exam_id: &str) -> Result<&'a Exam, JoinError> {
    exams
        .iter()
        .find(|e| e.id == exam_id)
        .ok_or_else(|| JoinError::NotFound(exam_id.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn exam(id: &str, title: &str, token: &str) -> Exam {
        Exam {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            token: token.into(),
            questions: vec![],
            created_at: Utc::now(),
            total_results: 0,
        }
    }

    fn exams() -> Vec<Exam> {
        vec![exam("e1", "Math", "1234"), exam("e2", "Biology", "5678")]
    }

    #[test]
    fn join_succeeds_with_matching_token() {
        let exams = exams();
        let found = join(&exams, &JoinRequest::new("e1", "1234")).unwrap();
        assert_eq!(found.id, "e1");
    }

    #[test]
    fn join_wrong_token() {
        let exams = exams();
        assert_eq!(
            join(&exams, &JoinRequest::new("e1", "9999")),
            Err(JoinError::WrongToken {
                exam_id: "e1".into()
            })
        );
    }

    #[test]
    fn join_unknown_exam() {
        let exams = exams();
        assert_eq!(
            join(&exams, &JoinRequest::new("nope", "1234")),
            Err(JoinError::NotFound("nope".into()))
        );
    }

    #[test]
    fn join_by_title_and_by_token_alone() {
        let exams = exams();
        assert_eq!(join(&exams, &JoinRequest::new("Biology", "5678")).unwrap().id, "e2");
        assert_eq!(join(&exams, &JoinRequest::new("", "5678")).unwrap().id, "e2");
        assert!(matches!(
            join(&exams, &JoinRequest::new("", "0000")),
            Err(JoinError::NotFound(_))
        ));
    }

    #[test]
    fn token_comparison_is_exact() {
        let exams = exams();
        assert!(join(&exams, &JoinRequest::new("e1", " 1234")).is_err());
    }

    #[test]
    fn deep_link_forms() {
        assert_eq!(deep_link("abc"), "exam/abc");
        assert_eq!(parse_deep_link("exam/abc").unwrap(), "abc");
        assert_eq!(parse_deep_link("#/exam/abc").unwrap(), "abc");
        assert_eq!(
            parse_deep_link("https://school.example/app/#/exam/abc").unwrap(),
            "abc"
        );
        assert!(matches!(parse_deep_link("exam/"), Err(JoinError::InvalidLink(_))));
        assert!(matches!(parse_deep_link("results/abc"), Err(JoinError::InvalidLink(_))));
    }

    #[test]
    fn resolve_link_to_exam() {
        let exams = exams();
        assert_eq!(resolve_deep_link(&exams, "#/exam/e2").unwrap().title, "Biology");
        assert_eq!(
            resolve_deep_link(&exams, "exam/zzz"),
            Err(JoinError::NotFound("zzz".into()))
        );
    }
}
