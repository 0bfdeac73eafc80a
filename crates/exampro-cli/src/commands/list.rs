//! The `exampro list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::AppContext;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let catalog = ctx.store.load()?;

    if catalog.exams.is_empty() {
        println!("No exams published. Run `exampro publish --exam <file>` to add one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Questions", "Token", "Attempts", "Created"]);
    for exam in &catalog.exams {
        let attempts = if exam.is_locked() {
            format!("{} (locked)", exam.total_results)
        } else {
            exam.total_results.to_string()
        };
        table.add_row(vec![
            Cell::new(&exam.id),
            Cell::new(&exam.title),
            Cell::new(exam.question_count()),
            Cell::new(&exam.token),
            Cell::new(attempts),
            Cell::new(exam.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("{table}");
    Ok(())
}
