//! TOML exam file parser.
//!
//! Lets a teacher author an exam as a text file and publish it with the CLI.
//! Missing question ids and a missing token are generated.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Deserialize;

use crate::authoring::{generate_id, generate_token, AuthoringPolicy};
use crate::model::{Exam, MatchingPair, Question, QuestionBody, QuestionKind, Verdict};

/// Intermediate TOML structure for parsing exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    prompt: String,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_answer: Option<TomlAnswer>,
    #[serde(default)]
    pairs: Vec<TomlPair>,
}

fn default_weight() -> f64 {
    1.0
}

/// `correct_answer` may be written as a bool, a string, or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TomlAnswer {
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct TomlPair {
    left: String,
    right: String,
}

/// Parse a single TOML file into an `Exam`.
pub fn parse_exam(path: &Path, policy: &AuthoringPolicy) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    parse_exam_str(&content, path, policy)
}

/// Parse a TOML string into an `Exam` (useful for testing).
pub fn parse_exam_str(content: &str, source_path: &Path, policy: &AuthoringPolicy) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    if parsed.questions.len() > policy.max_questions {
        bail!(
            "{}: {} questions exceeds the maximum of {}",
            source_path.display(),
            parsed.questions.len(),
            policy.max_questions
        );
    }

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| convert_question(q).with_context(|| format!("question {}", i + 1)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Exam {
        id: parsed.exam.id.unwrap_or_else(generate_id),
        title: parsed.exam.title,
        description: parsed.exam.description,
        token: parsed
            .exam
            .token
            .unwrap_or_else(|| generate_token(policy.token_length)),
        questions,
        created_at: Utc::now(),
        total_results: 0,
    })
}

fn convert_question(q: TomlQuestion) -> Result<Question> {
    let kind: QuestionKind = q.kind.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
    if !q.weight.is_finite() || q.weight < 0.0 {
        bail!("weight must be a non-negative number, got {}", q.weight);
    }

    let body = match kind {
        QuestionKind::SingleChoice => QuestionBody::SingleChoice {
            options: q.options,
            correct_answer: single(q.correct_answer, kind)?,
        },
        QuestionKind::ComplexChoice => QuestionBody::ComplexChoice {
            options: q.options,
            correct_answer: match q.correct_answer {
                Some(TomlAnswer::Many(values)) => values,
                Some(TomlAnswer::One(value)) => vec![value],
                Some(TomlAnswer::Flag(_)) => bail!("{kind} needs a list of options as correct_answer"),
                None => bail!("{kind} is missing correct_answer"),
            },
        },
        QuestionKind::ShortAnswer => QuestionBody::ShortAnswer {
            correct_answer: single(q.correct_answer, kind)?,
        },
        QuestionKind::TrueFalse => QuestionBody::TrueFalse {
            correct_answer: verdict(q.correct_answer, kind)?,
        },
        QuestionKind::AgreeDisagree => QuestionBody::AgreeDisagree {
            correct_answer: verdict(q.correct_answer, kind)?,
        },
        QuestionKind::Matching => {
            if q.pairs.is_empty() {
                bail!("{kind} needs at least one [[questions.pairs]] entry");
            }
            QuestionBody::Matching {
                matching_pairs: q
                    .pairs
                    .into_iter()
                    .map(|p| MatchingPair {
                        id: generate_id(),
                        left: p.left,
                        right: p.right,
                    })
                    .collect(),
            }
        }
    };

    Ok(Question::new(
        q.id.unwrap_or_else(generate_id),
        q.prompt,
        q.weight,
        body,
    ))
}

fn single(answer: Option<TomlAnswer>, kind: QuestionKind) -> Result<String> {
    match answer {
        Some(TomlAnswer::One(value)) => Ok(value),
        Some(_) => bail!("{kind} needs a single string as correct_answer"),
        None => bail!("{kind} is missing correct_answer"),
    }
}

fn verdict(answer: Option<TomlAnswer>, kind: QuestionKind) -> Result<Verdict> {
    match answer {
        Some(TomlAnswer::Flag(true)) => Ok(Verdict::True),
        Some(TomlAnswer::Flag(false)) => Ok(Verdict::False),
        Some(TomlAnswer::One(value)) => value.parse().map_err(|e: String| anyhow::anyhow!("{}", e)),
        Some(TomlAnswer::Many(_)) => bail!("{kind} needs true or false as correct_answer"),
        None => bail!("{kind} is missing correct_answer"),
    }
}

/// Recursively load all `.toml` exam files from a directory.
pub fn load_exam_directory(dir: &Path, policy: &AuthoringPolicy) -> Result<Vec<Exam>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            exams.extend(load_exam_directory(&path, policy)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exam(&path, policy) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const SAMPLE: &str = r#"
[exam]
id = "bio-1"
title = "Biology Quiz"
description = "Cells and plants"
token = "4821"

[[questions]]
id = "q1"
type = "SINGLE_CHOICE"
prompt = "Powerhouse of the cell?"
options = ["Nucleus", "Mitochondria"]
correct_answer = "Mitochondria"

[[questions]]
id = "q2"
type = "COMPLEX_CHOICE"
prompt = "Which are organelles?"
weight = 2.0
options = ["Ribosome", "Leaf", "Golgi"]
correct_answer = ["Ribosome", "Golgi"]

[[questions]]
id = "q3"
type = "TRUE_FALSE"
prompt = "Plants photosynthesise."
correct_answer = true

[[questions]]
id = "q4"
type = "agree_disagree"
prompt = "Biology is fun."
correct_answer = "agree"

[[questions]]
id = "q5"
type = "MATCHING"
prompt = "Match the parts."

[[questions.pairs]]
left = "Root"
right = "Absorbs water"

[[questions.pairs]]
left = "Leaf"
right = "Makes food"
"#;

    fn path() -> PathBuf {
        PathBuf::from("bio.toml")
    }

    #[test]
    fn parses_every_question_type() {
        let exam = parse_exam_str(SAMPLE, &path(), &AuthoringPolicy::default()).unwrap();
        assert_eq!(exam.id, "bio-1");
        assert_eq!(exam.token, "4821");
        assert_eq!(exam.questions.len(), 5);
        assert_eq!(exam.total_weight(), 6.0);
        assert_eq!(exam.total_results, 0);

        assert!(matches!(
            &exam.questions[1].body,
            QuestionBody::ComplexChoice { correct_answer, .. } if correct_answer.len() == 2
        ));
        assert!(matches!(
            exam.questions[2].body,
            QuestionBody::TrueFalse {
                correct_answer: Verdict::True
            }
        ));
        assert!(matches!(
            exam.questions[3].body,
            QuestionBody::AgreeDisagree {
                correct_answer: Verdict::True
            }
        ));
        match &exam.questions[4].body {
            QuestionBody::Matching { matching_pairs } => {
                assert_eq!(matching_pairs.len(), 2);
                assert_eq!(matching_pairs[0].left, "Root");
            }
            other => panic!("expected matching, got {other:?}"),
        }
    }

    #[test]
    fn generates_missing_ids_and_token() {
        let content = r#"
[exam]
title = "Untitled"

[[questions]]
type = "SHORT_ANSWER"
prompt = "2 + 2?"
correct_answer = "4"
"#;
        let exam = parse_exam_str(content, &path(), &AuthoringPolicy::default()).unwrap();
        assert!(!exam.id.is_empty());
        assert_eq!(exam.token.len(), 4);
        assert!(!exam.questions[0].id.is_empty());
    }

    #[test]
    fn rejects_unknown_type_and_missing_answer() {
        let unknown = r#"
[exam]
title = "Bad"

[[questions]]
type = "ESSAY"
prompt = "Discuss."
"#;
        let err = parse_exam_str(unknown, &path(), &AuthoringPolicy::default()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown question type"));

        let missing = r#"
[exam]
title = "Bad"

[[questions]]
type = "SHORT_ANSWER"
prompt = "Name?"
"#;
        let err = parse_exam_str(missing, &path(), &AuthoringPolicy::default()).unwrap_err();
        assert!(format!("{err:#}").contains("missing correct_answer"));
    }

    #[test]
    fn rejects_negative_and_nan_weights() {
        for weight in ["-1.0", "nan", "inf"] {
            let content = format!(
                r#"
[exam]
title = "Weights"

[[questions]]
type = "SHORT_ANSWER"
prompt = "2 + 2?"
weight = {weight}
correct_answer = "4"
"#
            );
            let err = parse_exam_str(&content, &path(), &AuthoringPolicy::default()).unwrap_err();
            assert!(
                format!("{err:#}").contains("weight must be a non-negative number"),
                "weight {weight}: {err:#}"
            );
        }

        let zero = r#"
[exam]
title = "Weights"

[[questions]]
type = "SHORT_ANSWER"
prompt = "2 + 2?"
weight = 0.0
correct_answer = "4"
"#;
        let exam = parse_exam_str(zero, &path(), &AuthoringPolicy::default()).unwrap();
        assert_eq!(exam.total_weight(), 0.0);
    }

    #[test]
    fn enforces_capacity() {
        let policy = AuthoringPolicy {
            max_questions: 1,
            ..Default::default()
        };
        let err = parse_exam_str(SAMPLE, &path(), &policy).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), SAMPLE).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let nested = dir.path().join("term2");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(
            nested.join("other.toml"),
            SAMPLE.replace("bio-1", "bio-2"),
        )
        .unwrap();

        let mut exams = load_exam_directory(dir.path(), &AuthoringPolicy::default()).unwrap();
        exams.sort_by(|a, b| a.id.cmp(&b.id));
        let ids: Vec<_> = exams.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["bio-1", "bio-2"]);
    }

    #[test]
    fn load_directory_requires_directory() {
        assert!(load_exam_directory(Path::new("/no/such/dir"), &AuthoringPolicy::default()).is_err());
    }
}
