//! Dead cycle rule: execution cycles no entry point can reach

use super::base::{Rule, RuleContext};
use super::format_cycle;
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

pub struct DeadCycleRule;

impl Rule for DeadCycleRule {
    fn id(&self) -> &'static str {
        "dead-cycle"
    }

    fn description(&self) -> &'static str {
        "Execution cycles unreachable from every entry point (orphaned logic)"
    }

    fn category(&self) -> &'static str {
        "reachability"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for cycle in &ctx.facts.cycles.dead {
            let Some(first) = cycle.first() else {
                continue;
            };
            findings.push(
                ctx.finding(
                    Target::Node(first.clone()),
                    format!(
                        "Execution cycle of {} node(s) is unreachable from any entry: {}",
                        cycle.len(),
                        format_cycle(cycle)
                    ),
                )
                .with_fix("Remove the orphaned loop or wire it to an event"),
            );
        }
        Ok(findings)
    }
}
