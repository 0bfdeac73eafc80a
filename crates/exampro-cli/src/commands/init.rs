//! The `exampro init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("exampro.toml").exists() {
        println!("exampro.toml already exists, skipping.");
    } else {
        std::fs::write("exampro.toml", SAMPLE_CONFIG)?;
        println!("Created exampro.toml");
    }

    std::fs::create_dir_all("exams")?;
    let example_path = std::path::Path::new("exams/example.toml");
    if example_path.exists() {
        println!("exams/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created exams/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit exams/example.toml or write your own exam");
    println!("  2. Run: exampro validate --exam exams/example.toml");
    println!("  3. Run: exampro publish --exam exams/example.toml");
    println!("  4. Share the printed token with your students");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# exampro configuration

pass_threshold = 0.7
max_questions = 500
token_length = 4
student_id_prefix = "SIS-"

[store]
type = "json"
dir = "./exampro-data"
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
title = "Example Quiz"
description = "A short quiz to get started"

[[questions]]
type = "SINGLE_CHOICE"
prompt = "What is 2 + 2?"
options = ["3", "4", "5"]
correct_answer = "4"

[[questions]]
type = "COMPLEX_CHOICE"
prompt = "Which of these are prime numbers?"
weight = 2.0
options = ["2", "4", "7", "9"]
correct_answer = ["2", "7"]

[[questions]]
type = "TRUE_FALSE"
prompt = "The sum of the angles of a triangle is 180 degrees."
correct_answer = true

[[questions]]
type = "SHORT_ANSWER"
prompt = "What is the capital of France?"
correct_answer = "Paris"

[[questions]]
type = "MATCHING"
prompt = "Match each number to its word."

[[questions.pairs]]
left = "1"
right = "one"

[[questions.pairs]]
left = "2"
right = "two"
"#;
