//! Code after return
//!
//! Execution ends at a FunctionResult node. A node is wired after the return
//! when, from every entry that reaches it, some return strictly dominates it.

use super::base::{Rule, RuleContext};
use crate::graph::NodeKind;
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

pub struct CodeAfterReturnRule;

impl Rule for CodeAfterReturnRule {
    fn id(&self) -> &'static str {
        "code-after-return"
    }

    fn description(&self) -> &'static str {
        "Nodes only reachable through a function's return node"
    }

    fn category(&self) -> &'static str {
        "reachability"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let graph = ctx.graph;
        let is_return = |id: &crate::graph::NodeId| {
            graph
                .node(id)
                .map(|n| n.kind == NodeKind::FunctionResult)
                .unwrap_or(false)
        };

        let mut findings = Vec::new();
        for node in graph.nodes() {
            if !ctx.facts.reachable.contains(&node.id) {
                continue;
            }
            if ctx.facts.dominated_by(&node.id, is_return) {
                findings.push(
                    ctx.finding(
                        Target::Node(node.id.clone()),
                        format!("Node '{}' is wired after a return node", node.label()),
                    )
                    .with_fix("Move the node before the return or remove it"),
                );
            }
        }
        Ok(findings)
    }
}
