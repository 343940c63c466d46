//! Rules command - list the built-in rules

use anyhow::Result;
use blueprint_analyzer::rules::RuleRegistry;
use blueprint_analyzer::Severity;
use console::style;

pub fn run() -> Result<()> {
    let registry = RuleRegistry::builtin();

    println!("\n{} ({})\n", style("Built-in rules").bold(), registry.len());
    for rule in registry.iter() {
        let severity = match rule.default_severity() {
            Severity::Error => style(rule.default_severity().to_string()).red(),
            Severity::Warning => style(rule.default_severity().to_string()).yellow(),
            Severity::Info => style(rule.default_severity().to_string()).dim(),
        };
        println!(
            "  {:<24} {:<8} {:<12} {}",
            style(rule.id()).cyan(),
            severity,
            rule.category(),
            rule.description()
        );
        for threshold in rule.thresholds() {
            println!(
                "  {:<24} {}",
                "",
                style(format!("{}.{} = {}", rule.id(), threshold.metric, threshold.default)).dim()
            );
        }
    }
    println!();
    Ok(())
}
