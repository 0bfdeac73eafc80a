//! The `exampro results` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use exampro_report::ResultsReport;

use super::AppContext;

pub fn execute(exam_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let catalog = ctx.store.load()?;
    let report = ResultsReport::build(&catalog, exam_filter.as_deref(), ctx.config.pass_threshold);

    if report.rows.is_empty() {
        println!("No results yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Student",
        "Student ID",
        "Exam",
        "Score",
        "%",
        "Result",
        "Violations",
        "Submitted",
    ]);
    for row in &report.rows {
        table.add_row(vec![
            Cell::new(&row.student_name),
            Cell::new(&row.student_id),
            Cell::new(row.exam_title.as_deref().unwrap_or("(deleted exam)")),
            Cell::new(format!("{}/{}", row.score, row.total_possible_score)),
            Cell::new(percent(row.percentage)),
            Cell::new(if row.passed { "PASS" } else { "FAIL" }),
            Cell::new(row.violation_count),
            Cell::new(row.timestamp.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");

    for stats in report.statistics.iter().filter(|s| s.attempts > 0) {
        println!(
            "{}: {} attempt(s), mean {}, pass rate {}, avg violations {:.1}",
            stats.title,
            stats.attempts,
            percent(stats.mean_percentage),
            percent(stats.pass_rate),
            stats.avg_violations,
        );
        if let Some(hardest) = stats.hardest_question() {
            println!(
                "  hardest question: {} ({} correct)",
                hardest.question_id,
                percent(hardest.correct_rate())
            );
        }
    }

    Ok(())
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}
