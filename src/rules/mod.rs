//! Graph rules
//!
//! Each rule is a `Rule` trait object registered by id. Rules read the
//! graph, the traversal facts and the metrics of one run and return
//! findings; they never see each other's output.

pub mod base;
pub mod engine;
pub mod registry;

mod code_after_return;
mod dangling_pin;
mod dead_cycle;
mod deep_nesting;
mod deprecated_node;
mod excessive_complexity;
mod exec_cycle;
mod exec_fan_in;
mod missing_entry;
mod trivial_graph;
mod unreachable_node;

pub use base::{EvaluationSummary, Rule, RuleContext, RuleResult, RuleSettings, Threshold};
pub use engine::{failure_finding, RuleEngine, RuleEngineBuilder, RuleInputs, RULE_EXECUTION_FAILED};
pub use registry::RuleRegistry;

pub use code_after_return::CodeAfterReturnRule;
pub use dangling_pin::DanglingPinRule;
pub use dead_cycle::DeadCycleRule;
pub use deep_nesting::DeepNestingRule;
pub use deprecated_node::DeprecatedNodeRule;
pub use excessive_complexity::ExcessiveComplexityRule;
pub use exec_cycle::ExecCycleRule;
pub use exec_fan_in::ExecFanInRule;
pub use missing_entry::MissingEntryRule;
pub use trivial_graph::{TrivialGraphRule, TRIVIAL_GRAPH_PHRASE};
pub use unreachable_node::UnreachableNodeRule;

use std::sync::Arc;

/// Option key holding the deprecated kind / function names
pub const OPTION_DEPRECATED_NODES: &str = "deprecated_nodes";
/// Option key holding the exec fan-in policy
pub const OPTION_EXEC_FAN_IN: &str = "exec_fan_in";

/// Every built-in rule
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(UnreachableNodeRule),
        Arc::new(DeadCycleRule),
        Arc::new(ExcessiveComplexityRule),
        Arc::new(DeprecatedNodeRule),
        Arc::new(DanglingPinRule),
        Arc::new(TrivialGraphRule),
        Arc::new(ExecCycleRule),
        Arc::new(CodeAfterReturnRule),
        Arc::new(ExecFanInRule),
        Arc::new(DeepNestingRule),
        Arc::new(MissingEntryRule),
    ]
}

/// Render a cycle as `a -> b -> a`
pub(crate) fn format_cycle(cycle: &[crate::graph::NodeId]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
    if let Some(first) = parts.first().copied() {
        parts.push(first);
    }
    parts.join(" -> ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::graph::{ingest, Graph, GraphSnapshot};
    use crate::metrics;
    use crate::models::Finding;
    use crate::traversal::TraversalFacts;

    pub fn graph(snapshot: GraphSnapshot) -> Graph {
        ingest(&snapshot).unwrap()
    }

    /// Evaluate one rule with the given settings
    pub fn run_with(rule: &dyn Rule, graph: &Graph, settings: &RuleSettings) -> Vec<Finding> {
        let facts = TraversalFacts::compute(graph);
        let metrics = metrics::collect(graph, &facts);
        let ctx = RuleContext {
            graph,
            facts: &facts,
            metrics: &metrics,
            settings,
        };
        rule.evaluate(&ctx).unwrap()
    }

    /// Evaluate one rule with its defaults
    pub fn run(rule: &dyn Rule, graph: &Graph) -> Vec<Finding> {
        run_with(rule, graph, &RuleSettings::defaults_for(rule))
    }
}
