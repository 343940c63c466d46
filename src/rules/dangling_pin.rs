//! Dangling pin rule
//!
//! A data input without a default value that is not optional must be fed
//! by a link. Execution pins and outputs are never dangling.

use super::base::{Rule, RuleContext};
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

pub struct DanglingPinRule;

impl Rule for DanglingPinRule {
    fn id(&self) -> &'static str {
        "dangling-pin"
    }

    fn description(&self) -> &'static str {
        "Required data inputs with no link and no default value"
    }

    fn category(&self) -> &'static str {
        "correctness"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for node in ctx.graph.nodes() {
            for pin in ctx.graph.pins_of(&node.id) {
                if !pin.is_required_input() || !pin.links.is_empty() {
                    continue;
                }
                findings.push(
                    ctx.finding(
                        Target::Pin(pin.id.clone()),
                        format!(
                            "Required {} input '{}' of node '{}' is not connected",
                            pin.kind,
                            pin.label(),
                            node.label()
                        ),
                    )
                    .with_fix("Link a value into the pin or give it a default"),
                );
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphSnapshot, NodeRecord, PinDirection, PinRecord};
    use crate::rules::test_support::{graph, run};

    #[test]
    fn test_only_unfed_required_inputs() {
        let g = graph(
            GraphSnapshot::new("g")
                .with_node(
                    NodeRecord::new("get", "VariableGet")
                        .with_pin(PinRecord::new("get.out", PinDirection::Output, "float")),
                )
                .with_node(
                    NodeRecord::new("call", "FunctionCall")
                        .with_exec_pins()
                        .with_pin(PinRecord::new("call.fed", PinDirection::Input, "float"))
                        .with_pin(PinRecord::new("call.missing", PinDirection::Input, "object"))
                        .with_pin(
                            PinRecord::new("call.defaulted", PinDirection::Input, "int").with_default("3"),
                        )
                        .with_pin(PinRecord::new("call.opt", PinDirection::Input, "string").optional()),
                )
                .with_link("get.out", "call.fed"),
        );
        let findings = run(&DanglingPinRule, &g);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].target, Target::Pin("call.missing".into()));
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].message.contains("object"));
    }
}
