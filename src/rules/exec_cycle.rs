//! Live execution cycles: reachable loops built from exec links, which the
//! runtime will follow until something breaks them

use super::base::{Rule, RuleContext};
use super::format_cycle;
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

pub struct ExecCycleRule;

impl Rule for ExecCycleRule {
    fn id(&self) -> &'static str {
        "exec-cycle"
    }

    fn description(&self) -> &'static str {
        "Execution cycles reachable from an entry point (potential infinite loop)"
    }

    fn category(&self) -> &'static str {
        "correctness"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        Ok(ctx
            .facts
            .cycles
            .live
            .iter()
            .filter_map(|cycle| {
                let first = cycle.first()?;
                Some(
                    ctx.finding(
                        Target::Node(first.clone()),
                        format!("Execution cycle may never terminate: {}", format_cycle(cycle)),
                    )
                    .with_fix("Use a Loop node or a timer instead of wiring execution back on itself"),
                )
            })
            .collect())
    }
}
