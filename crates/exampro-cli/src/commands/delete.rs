//! The `exampro delete` command.

use std::path::PathBuf;

use anyhow::Result;

use super::AppContext;

pub fn execute(exam_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let mut catalog = ctx.store.load()?;

    let exam = catalog.delete_exam(&exam_id)?;
    ctx.store.save(&catalog)?;

    let kept = catalog.results_for(&exam_id).count();
    tracing::info!(exam = %exam_id, kept, "deleted");
    println!("Deleted \"{}\" ({kept} result(s) kept)", exam.title);
    Ok(())
}
