//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use crate::json::ResultsReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn format_percentage(p: Option<f64>) -> String {
    match p {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => "-".to_string(),
    }
}

/// Generate an HTML page from a results report.
pub fn generate_html(report: &ResultsReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>exampro results</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>Exam results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} results | pass mark {:.0}% | {}</p>\n",
        report.rows.len(),
        report.pass_threshold * 100.0,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    if !report.statistics.is_empty() {
        html.push_str("<section class=\"dashboard\">\n");
        html.push_str("<h2>Summary</h2>\n");
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Exam</th><th>Attempts</th><th>Mean</th><th>Min</th><th>Max</th><th>Pass rate</th><th>Avg violations</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for stats in &report.statistics {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td></tr>\n",
                html_escape(&stats.title),
                stats.attempts,
                format_percentage(stats.mean_percentage),
                format_percentage(stats.min_percentage),
                format_percentage(stats.max_percentage),
                format_percentage(stats.pass_rate),
                stats.avg_violations,
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Results</h2>\n");
    if report.rows.is_empty() {
        html.push_str("<p class=\"empty\">No results yet.</p>\n");
    } else {
        html.push_str("<table class=\"results-table\" id=\"results\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Student</th><th onclick=\"sortTable(1)\">Student ID</th><th onclick=\"sortTable(2)\">Exam</th><th onclick=\"sortTable(3)\">Score</th><th onclick=\"sortTable(4)\">Percentage</th><th onclick=\"sortTable(5)\">Violations</th><th onclick=\"sortTable(6)\">Submitted</th></tr></thead>\n");
        html.push_str("<tbody>\n");

        for r in &report.rows {
            let status = if r.passed { "pass" } else { "fail" };
            let exam = match &r.exam_title {
                Some(title) => html_escape(title),
                None => "<span class=\"deleted\">deleted exam</span>".to_string(),
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&r.student_name),
                html_escape(&r.student_id),
                exam,
                r.score,
                r.total_possible_score,
                status,
                format_percentage(r.percentage),
                r.violation_count,
                r.timestamp.format("%Y-%m-%d %H:%M"),
            ));
        }

        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ResultsReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --muted: #9ca3af; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .empty { color: var(--muted); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.deleted { color: var(--muted); font-style: italic; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::tests::sample_catalog;
    use exampro_core::catalog::Catalog;

    #[test]
    fn html_report_contains_required_elements() {
        let report = ResultsReport::build(&sample_catalog(), None, 0.7);
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Algebra"));
        assert!(html.contains("Ayu"));
        assert!(html.contains("deleted exam"));
        assert!(html.contains("class=\"pass\">100.0%"));
        assert!(html.contains("class=\"fail\">50.0%"));
    }

    #[test]
    fn student_names_are_escaped() {
        let report = ResultsReport::build(&sample_catalog(), None, 0.7);
        let html = generate_html(&report);
        assert!(html.contains("&lt;Budi&gt;"));
        assert!(!html.contains("<Budi>"));
    }

    #[test]
    fn empty_report_says_so() {
        let report = ResultsReport::build(&Catalog::default(), None, 0.7);
        let html = generate_html(&report);
        assert!(html.contains("No results yet."));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = ResultsReport::build(&sample_catalog(), None, 0.7);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html_report(&report, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Exam results"));
    }
}
