//! Graph-level metrics

use super::node::NodeMetrics;
use crate::graph::{Graph, LinkFlow, NodeId};
use crate::traversal::TraversalFacts;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub link_count: usize,
    pub exec_link_count: usize,
    pub data_link_count: usize,
    pub entry_count: usize,
    /// E - N + 2P over nodes that own an exec pin
    pub cyclomatic_complexity: usize,
    pub max_nesting_depth: usize,
    /// Nodes no entry reaches along execution links
    pub unreachable_count: usize,
    pub cycle_count: usize,
    pub dead_cycle_count: usize,
    pub back_edge_count: usize,
    pub max_node_complexity: f64,
}

impl GraphMetrics {
    pub fn compute(
        graph: &Graph,
        facts: &TraversalFacts,
        nodes: &BTreeMap<NodeId, NodeMetrics>,
    ) -> Self {
        let exec_link_count = graph
            .links()
            .filter(|link| graph.flow(link) == LinkFlow::Exec)
            .count();

        let unreachable_count = graph
            .node_ids()
            .iter()
            .filter(|id| !facts.is_reachable(id))
            .count();

        Self {
            node_count: graph.node_count(),
            link_count: graph.link_count(),
            exec_link_count,
            data_link_count: graph.link_count() - exec_link_count,
            entry_count: facts.entries.len(),
            cyclomatic_complexity: cyclomatic_complexity(graph, facts),
            max_nesting_depth: nodes.values().map(|m| m.nesting_depth).max().unwrap_or(0),
            unreachable_count,
            cycle_count: facts.cycles.cycle_count(),
            dead_cycle_count: facts.cycles.dead.len(),
            back_edge_count: facts.cycles.back_edges.len(),
            max_node_complexity: nodes
                .values()
                .map(|m| m.complexity)
                .fold(0.0, f64::max),
        }
    }
}

/// E - N + 2P over the exec view, ignoring nodes without exec pins
///
/// A node without exec pins has no exec edges, so it is its own weak
/// component; each one is subtracted from the full-view component count.
fn cyclomatic_complexity(graph: &Graph, facts: &TraversalFacts) -> usize {
    let exec_nodes = graph
        .node_ids()
        .iter()
        .filter(|id| graph.has_exec_pins(id))
        .count();
    if exec_nodes == 0 {
        return 0;
    }

    let data_only = graph.node_count() - exec_nodes;
    let components = facts.exec_components.saturating_sub(data_only);
    let edges = facts.exec.edge_count();

    (edges + 2 * components).saturating_sub(exec_nodes)
}
