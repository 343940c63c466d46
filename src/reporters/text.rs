//! Plain text reporter
//!
//! No colours or box drawing, so the output can be pasted into an issue,
//! a chat or an LLM prompt as-is.

use crate::models::Severity;
use crate::report::Report;
use anyhow::Result;
use std::fmt::Write;

/// Severity tag
fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "[E]",
        Severity::Warning => "[W]",
        Severity::Info => "[I]",
    }
}

/// Render report as plain text
pub fn render(report: &Report) -> Result<String> {
    let mut out = String::new();
    let metrics = report.graph_metrics();

    writeln!(out, "Blueprint analysis: {}", report.display_name())?;
    if let Some(source) = &report.source {
        writeln!(out, "Source: {}", source)?;
    }
    if let Some(at) = report.generated_at {
        writeln!(out, "Generated: {}", at.to_rfc3339())?;
    }
    writeln!(
        out,
        "Score: {:.0}/100  Grade: {}",
        report.health.score, report.health.grade
    )?;
    writeln!(out)?;

    writeln!(out, "METRICS")?;
    writeln!(
        out,
        "  Nodes: {}  Links: {} ({} exec, {} data)  Entries: {}",
        metrics.node_count,
        metrics.link_count,
        metrics.exec_link_count,
        metrics.data_link_count,
        metrics.entry_count
    )?;
    writeln!(
        out,
        "  Cyclomatic complexity: {}  Max nesting: {}  Max node complexity: {:.1}",
        metrics.cyclomatic_complexity, metrics.max_nesting_depth, metrics.max_node_complexity
    )?;
    writeln!(
        out,
        "  Unreachable: {}  Cycles: {} ({} dead)  Back-edges: {}",
        metrics.unreachable_count,
        metrics.cycle_count,
        metrics.dead_cycle_count,
        metrics.back_edge_count
    )?;
    writeln!(out)?;

    let summary = &report.summary;
    writeln!(
        out,
        "FINDINGS ({} total: {} error, {} warning, {} info)",
        summary.total, summary.error, summary.warning, summary.info
    )?;
    if report.findings.is_empty() {
        writeln!(out, "  No findings.")?;
    }
    for finding in &report.findings {
        writeln!(
            out,
            "  {} {} ({}): {}",
            severity_tag(finding.severity),
            finding.rule_id,
            finding.target,
            finding.message
        )?;
        if let Some(fix) = &finding.suggested_fix {
            writeln!(out, "      fix: {}", fix)?;
        }
    }

    Ok(out)
}
