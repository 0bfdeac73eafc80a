//! The `exampro report` command.

use std::path::PathBuf;

use anyhow::Result;

use exampro_report::{write_html_report, ResultsReport};

use super::AppContext;

pub fn execute(
    format: String,
    output: PathBuf,
    exam_filter: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let catalog = ctx.store.load()?;
    let report = ResultsReport::build(&catalog, exam_filter.as_deref(), ctx.config.pass_threshold);

    match format.as_str() {
        "html" => write_html_report(&report, &output)?,
        "json" => report.save_json(&output)?,
        other => anyhow::bail!("unknown format: {other} (expected html or json)"),
    }

    println!(
        "Wrote {} report with {} result(s) to {}",
        format,
        report.rows.len(),
        output.display()
    );
    Ok(())
}
