//! Per-node execution metrics

use crate::graph::{Graph, LinkFlow, NodeId};
use crate::traversal::TraversalFacts;
use serde::Serialize;

/// Score weights. Fixed so scores compare across graphs.
pub const BRANCH_WEIGHT: f64 = 2.0;
pub const BACK_EDGE_WEIGHT: f64 = 3.0;
pub const FAN_WEIGHT: f64 = 0.5; // applied to fan_in + fan_out

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeMetrics {
    /// Incoming exec links
    pub fan_in: usize,
    /// Outgoing exec links
    pub fan_out: usize,
    pub nesting_depth: usize,
    /// Distinct exec successors minus one
    pub branches: usize,
    /// Cycle-closing exec edges leaving this node
    pub back_edges: usize,
    pub complexity: f64,
}

impl NodeMetrics {
    pub fn compute(graph: &Graph, facts: &TraversalFacts, node: &NodeId) -> Self {
        let count_exec = |links: &[crate::graph::LinkId]| {
            links
                .iter()
                .filter_map(|id| graph.link(id))
                .filter(|link| graph.flow(link) == LinkFlow::Exec)
                .count()
        };

        let fan_in = count_exec(graph.incoming(node));
        let fan_out = count_exec(graph.outgoing(node));
        let branches = facts.exec_successors(node).saturating_sub(1);
        let back_edges = facts.cycles.back_edges_from(node);

        Self {
            fan_in,
            fan_out,
            nesting_depth: facts.nesting_depth(node),
            branches,
            back_edges,
            complexity: complexity_score(branches, back_edges, fan_in, fan_out),
        }
    }
}

pub fn complexity_score(branches: usize, back_edges: usize, fan_in: usize, fan_out: usize) -> f64 {
    BRANCH_WEIGHT * branches as f64
        + BACK_EDGE_WEIGHT * back_edges as f64
        + FAN_WEIGHT * (fan_in + fan_out) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_score() {
        assert_eq!(complexity_score(0, 0, 0, 0), 0.0);
        assert_eq!(complexity_score(1, 0, 1, 2), 3.5);
        assert_eq!(complexity_score(2, 1, 1, 3), 9.0);
    }
}
