//! The `exampro validate` command.

use std::path::PathBuf;

use anyhow::Result;

use exampro_core::authoring::validate_exam;
use exampro_core::parser::{load_exam_directory, parse_exam};
use exampro_store::config::load_config_from;

pub fn execute(exam_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let policy = load_config_from(config_path.as_deref())?.policy();
    let exams = if exam_path.is_dir() {
        load_exam_directory(&exam_path, &policy)?
    } else {
        vec![parse_exam(&exam_path, &policy)?]
    };

    let mut total_warnings = 0;

    for exam in &exams {
        println!(
            "Exam: {} ({} questions, total weight {})",
            exam.title,
            exam.question_count(),
            exam.total_weight()
        );

        let warnings = validate_exam(exam, &policy);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
