//! Exec fan-in rule
//!
//! Reports execution inputs fed by more than one link. Active only under
//! the `warn` fan-in policy: `allow` accepts them silently and `reject`
//! already refused the graph at ingestion.

use super::base::{Rule, RuleContext};
use super::OPTION_EXEC_FAN_IN;
use crate::graph::{FanInPolicy, PinDirection};
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

pub struct ExecFanInRule;

impl Rule for ExecFanInRule {
    fn id(&self) -> &'static str {
        "exec-fan-in"
    }

    fn description(&self) -> &'static str {
        "Execution input pins with more than one incoming link"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let policy = ctx
            .settings
            .get_option_or(OPTION_EXEC_FAN_IN, FanInPolicy::default());
        if policy != FanInPolicy::Warn {
            return Ok(vec![]);
        }

        let mut findings = Vec::new();
        for node in ctx.graph.nodes() {
            for pin in ctx.graph.pins_of(&node.id) {
                if !pin.is_exec() || pin.direction != PinDirection::Input || pin.links.len() < 2 {
                    continue;
                }
                findings.push(
                    ctx.finding(
                        Target::Pin(pin.id.clone()),
                        format!(
                            "Execution input '{}' of node '{}' has {} incoming links",
                            pin.label(),
                            node.label(),
                            pin.links.len()
                        ),
                    )
                    .with_fix("Merge the incoming paths through a Sequence or a function"),
                );
            }
        }
        Ok(findings)
    }
}
