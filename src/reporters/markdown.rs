//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for pull request comments and wikis.

use crate::models::{Finding, Severity};
use crate::report::Report;
use anyhow::Result;

/// Maximum findings to show per severity level
const MAX_FINDINGS_PER_SEVERITY: usize = 25;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &Report) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(report));
    md.push('\n');
    md.push_str(&render_metrics(report));
    md.push('\n');
    md.push_str(&render_findings(report));

    Ok(md)
}

fn render_header(report: &Report) -> String {
    let generated = report
        .generated_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "n/a".to_string());

    let mut header = format!(
        "# Blueprint Analysis: {}\n\n**Grade: {}** | **Score: {:.0}/100**\n\n",
        escape(report.display_name()),
        report.health.grade,
        report.health.score
    );
    if let Some(source) = &report.source {
        header.push_str(&format!("Source: `{}`\n\n", source));
    }
    header.push_str(&format!("Generated: {}\n", generated));
    header
}

fn render_metrics(report: &Report) -> String {
    let m = report.graph_metrics();
    let rows = [
        ("Nodes", m.node_count.to_string()),
        ("Links", m.link_count.to_string()),
        ("Exec links", m.exec_link_count.to_string()),
        ("Data links", m.data_link_count.to_string()),
        ("Entry points", m.entry_count.to_string()),
        ("Cyclomatic complexity", m.cyclomatic_complexity.to_string()),
        ("Max nesting depth", m.max_nesting_depth.to_string()),
        ("Max node complexity", format!("{:.1}", m.max_node_complexity)),
        ("Unreachable nodes", m.unreachable_count.to_string()),
        ("Cycles", m.cycle_count.to_string()),
        ("Dead cycles", m.dead_cycle_count.to_string()),
        ("Back-edges", m.back_edge_count.to_string()),
    ];

    let mut out = String::from("## Metrics\n\n| Metric | Value |\n|--------|-------|\n");
    for (name, value) in rows {
        out.push_str(&format!("| {} | {} |\n", name, value));
    }
    out
}

fn render_findings(report: &Report) -> String {
    let summary = &report.summary;
    let mut out = format!(
        "## Findings\n\n| Severity | Count |\n|----------|-------|\n| Error | {} |\n| Warning | {} |\n| Info | {} |\n",
        summary.error, summary.warning, summary.info
    );

    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let findings: Vec<&Finding> = report
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect();
        if findings.is_empty() {
            continue;
        }

        out.push_str(&format!("\n### {} ({})\n\n", heading(severity), findings.len()));
        out.push_str("| Rule | Target | Message | Suggested fix |\n");
        out.push_str("|------|--------|---------|---------------|\n");
        for finding in findings.iter().take(MAX_FINDINGS_PER_SEVERITY) {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                finding.rule_id,
                escape(&finding.target.to_string()),
                escape(&finding.message),
                finding.suggested_fix.as_deref().map(escape).unwrap_or_default()
            ));
        }
        if findings.len() > MAX_FINDINGS_PER_SEVERITY {
            out.push_str(&format!(
                "\n*...and {} more*\n",
                findings.len() - MAX_FINDINGS_PER_SEVERITY
            ));
        }
    }
    out
}

fn heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Errors",
        Severity::Warning => "Warnings",
        Severity::Info => "Info",
    }
}

/// Escape characters that break table cells
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
