//! JSON reporter
//!
//! Outputs the portable form of the report as pretty-printed JSON.

use crate::report::Report;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &Report) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&report.to_portable_form())?;
    out.push('\n');
    Ok(out)
}
