//! Unreachable node rule
//!
//! A node is reachable when an entry reaches it along execution links.
//! Every other node is reported, pure data producers included: they have
//! no execution path of their own.

use super::base::{Rule, RuleContext};
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

pub struct UnreachableNodeRule;

impl Rule for UnreachableNodeRule {
    fn id(&self) -> &'static str {
        "unreachable-node"
    }

    fn description(&self) -> &'static str {
        "Nodes that no entry point reaches along execution links"
    }

    fn category(&self) -> &'static str {
        "reachability"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        Ok(ctx
            .graph
            .nodes()
            .filter(|node| !ctx.facts.is_reachable(&node.id))
            .map(|node| {
                if ctx.facts.is_live(&node.id) {
                    ctx.finding(
                        Target::Node(node.id.clone()),
                        format!(
                            "{} node '{}' has no execution path; it only feeds data to executed nodes",
                            node.kind,
                            node.label()
                        ),
                    )
                    .with_fix("Wire the value through an executed node or inline it as a pin default")
                } else {
                    ctx.finding(
                        Target::Node(node.id.clone()),
                        format!(
                            "{} node '{}' is never executed: no entry point reaches it",
                            node.kind,
                            node.label()
                        ),
                    )
                    .with_fix("Connect the node to an execution path or delete it")
                }
            })
            .collect())
    }
}
