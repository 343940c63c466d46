//! Metric collection
//!
//! Per-node metrics fan out over rayon; each worker produces only its own
//! node's entry and the results are collected into a sorted map. Graph-level
//! metrics are folded from those afterwards.

pub mod graph;
pub mod node;

pub use self::graph::GraphMetrics;
pub use self::node::{complexity_score, NodeMetrics};

use crate::graph::{Graph, NodeId};
use crate::traversal::TraversalFacts;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Every metric of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricSet {
    pub graph: GraphMetrics,
    pub nodes: BTreeMap<NodeId, NodeMetrics>,
}

impl MetricSet {
    pub fn node(&self, id: &NodeId) -> Option<&NodeMetrics> {
        self.nodes.get(id)
    }
}

pub fn collect(graph: &Graph, facts: &TraversalFacts) -> MetricSet {
    let nodes: BTreeMap<NodeId, NodeMetrics> = graph
        .node_ids()
        .par_iter()
        .map(|id| (id.clone(), NodeMetrics::compute(graph, facts, id)))
        .collect();

    let graph_metrics = GraphMetrics::compute(graph, facts, &nodes);
    debug!(
        "Metrics for '{}': cyclomatic={}, max_nesting={}, unreachable={}",
        graph.id(),
        graph_metrics.cyclomatic_complexity,
        graph_metrics.max_nesting_depth,
        graph_metrics.unreachable_count
    );

    MetricSet {
        graph: graph_metrics,
        nodes,
    }
}
