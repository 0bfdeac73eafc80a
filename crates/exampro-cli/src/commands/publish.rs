//! The `exampro publish` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use exampro_core::authoring::validate_exam;
use exampro_core::join::deep_link;
use exampro_core::parser::parse_exam;

use super::AppContext;

pub fn execute(exam_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let policy = ctx.config.policy();

    let exam = parse_exam(&exam_path, &policy)?;
    for w in validate_exam(&exam, &policy) {
        let scope = w.question_id.as_deref().unwrap_or("exam");
        eprintln!("  [{scope}] WARNING: {}", w.message);
    }

    let mut catalog = ctx.store.load()?;
    // Titles also identify exams when students join, so they stay unique.
    if let Some(existing) = catalog
        .exams
        .iter()
        .find(|e| e.title == exam.title && e.id != exam.id)
    {
        anyhow::bail!(
            "an exam titled \"{}\" is already published as {}; add `id = \"{}\"` under [exam] in {} to update it",
            existing.title,
            existing.id,
            existing.id,
            exam_path.display()
        );
    }
    let replacing = catalog.find_exam(&exam.id).is_some();
    let (id, title, token, count) = (
        exam.id.clone(),
        exam.title.clone(),
        exam.token.clone(),
        exam.question_count(),
    );
    catalog
        .upsert_exam(exam)
        .with_context(|| format!("cannot publish {}", exam_path.display()))?;
    ctx.store.save(&catalog)?;

    tracing::info!(exam = %id, replacing, "published");
    println!(
        "{} \"{title}\" ({count} questions)",
        if replacing { "Updated" } else { "Published" }
    );
    println!("  Exam ID: {id}");
    println!("  Token:   {token}");
    println!("  Link:    #/{}", deep_link(&id));

    Ok(())
}
