//! Empty or trivial graph rule

use super::base::{Rule, RuleContext};
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

/// Shared by every message so consumers can match on it
pub const TRIVIAL_GRAPH_PHRASE: &str = "empty or trivial graph";

pub struct TrivialGraphRule;

impl Rule for TrivialGraphRule {
    fn id(&self) -> &'static str {
        "trivial-graph"
    }

    fn description(&self) -> &'static str {
        "Graphs with no nodes, or with neither links nor entry points"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let graph = ctx.graph;
        let message = if graph.is_empty() {
            format!("Graph has no nodes ({})", TRIVIAL_GRAPH_PHRASE)
        } else if graph.link_count() == 0 && graph.entry_nodes().is_empty() {
            format!(
                "Graph has {} node(s), no links and no entry points ({})",
                graph.node_count(),
                TRIVIAL_GRAPH_PHRASE
            )
        } else {
            return Ok(vec![]);
        };

        Ok(vec![ctx.finding(Target::Graph, message)])
    }
}
