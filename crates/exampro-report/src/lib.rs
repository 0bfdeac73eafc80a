//! exampro-report: Results reports.
//!
//! Builds a [`ResultsReport`] from the catalog and renders it as JSON or as a
//! self-contained HTML page.

pub mod html;
pub mod json;

pub use html::{generate_html, write_html_report};
pub use json::{ResultRow, ResultsReport};
