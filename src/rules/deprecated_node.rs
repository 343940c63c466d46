//! Deprecated node rule
//!
//! A node is deprecated when its `deprecated` property is `true`, or when
//! its kind name or `function` property appears in the configured list.
//! List entries match case- and separator-insensitively.

use super::base::{Rule, RuleContext};
use super::OPTION_DEPRECATED_NODES;
use crate::graph::Node;
use crate::models::{kebab_case, Finding, Severity, Target};
use anyhow::Result;
use std::collections::BTreeSet;

pub struct DeprecatedNodeRule;

impl DeprecatedNodeRule {
    /// Why a node counts as deprecated, if it does
    fn reason(node: &Node, listed: &BTreeSet<String>) -> Option<String> {
        if node.get_bool("deprecated") == Some(true) {
            return Some("is marked deprecated".to_string());
        }
        if listed.contains(&kebab_case(node.kind.name())) {
            return Some(format!("uses deprecated node kind '{}'", node.kind));
        }
        match node.get_str("function") {
            Some(function) if listed.contains(&kebab_case(function)) => {
                Some(format!("calls deprecated function '{}'", function))
            }
            _ => None,
        }
    }
}

impl Rule for DeprecatedNodeRule {
    fn id(&self) -> &'static str {
        "deprecated-node"
    }

    fn description(&self) -> &'static str {
        "Nodes flagged deprecated, or whose kind or function is on the deprecated list"
    }

    fn category(&self) -> &'static str {
        "maintenance"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let listed: BTreeSet<String> = ctx
            .settings
            .get_option_or::<Vec<String>>(OPTION_DEPRECATED_NODES, Vec::new())
            .iter()
            .map(|name| kebab_case(name))
            .collect();

        let mut findings = Vec::new();
        for node in ctx.graph.nodes() {
            let Some(reason) = Self::reason(node, &listed) else {
                continue;
            };
            let fix = match node.get_str("replacement") {
                Some(replacement) => format!("Replace it with '{}'", replacement),
                None => "Replace it with the supported equivalent".to_string(),
            };
            findings.push(
                ctx.finding(
                    Target::Node(node.id.clone()),
                    format!("Node '{}' {}", node.label(), reason),
                )
                .with_fix(fix),
            );
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphSnapshot, NodeRecord};
    use crate::rules::base::RuleSettings;
    use crate::rules::test_support::{graph, run, run_with};
    use serde_json::json;

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::new("g")
            .with_node(
                NodeRecord::new("flagged", "FunctionCall")
                    .with_property("deprecated", json!(true))
                    .with_property("replacement", json!("NewThing")),
            )
            .with_node(NodeRecord::new("timeline", "K2Node_Timeline"))
            .with_node(
                NodeRecord::new("call", "FunctionCall").with_property("function", json!("GetPlayerPawn")),
            )
            .with_node(NodeRecord::new("fine", "FunctionCall"))
    }

    #[test]
    fn test_property_flag_only_by_default() {
        let findings = run(&DeprecatedNodeRule, &graph(snapshot()));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].target, Target::Node("flagged".into()));
        assert_eq!(findings[0].suggested_fix.as_deref(), Some("Replace it with 'NewThing'"));
    }

    #[test]
    fn test_configured_kinds_and_functions() {
        let settings = RuleSettings::defaults_for(&DeprecatedNodeRule).with_option(
            OPTION_DEPRECATED_NODES,
            json!(["K2Node_Timeline", "get_player_pawn"]),
        );
        let findings = run_with(&DeprecatedNodeRule, &graph(snapshot()), &settings);

        let targets: Vec<String> = findings.iter().map(|f| f.target.to_string()).collect();
        assert_eq!(targets, vec!["node call", "node flagged", "node timeline"]);
        assert!(findings[0].message.contains("GetPlayerPawn"));
    }
}
