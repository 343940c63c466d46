//! Structural facts computed once per analysis run and shared read-only

use super::{CycleReport, FlowView, Traversal};
use crate::graph::{Graph, LinkFlow, NodeId};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TraversalFacts {
    pub entries: Vec<NodeId>,
    /// Exec-reachable from some entry, entries included
    pub reachable: BTreeSet<NodeId>,
    /// Reachable nodes plus the data producers feeding them
    pub live: BTreeSet<NodeId>,
    pub cycles: CycleReport,
    /// Nodes on an exec cycle (SCC larger than one, or self-loop)
    pub cyclic: BTreeSet<NodeId>,
    pub layers: Vec<BTreeSet<NodeId>>,
    /// Immediate-dominator map per entry
    pub dominators: BTreeMap<NodeId, BTreeMap<NodeId, NodeId>>,
    /// Branching levels above a node, minimum over the entries reaching it
    pub nesting: BTreeMap<NodeId, usize>,
    pub exec_components: usize,
    pub exec: FlowView,
}

impl TraversalFacts {
    pub fn compute(graph: &Graph) -> Self {
        let traversal = Traversal::new(graph);
        let entries = graph.entry_nodes().to_vec();

        let reachable = traversal.reachable_from(&entries);
        let mut live = reachable.clone();
        live.extend(traversal.data_upstream(&reachable));

        let cycles = traversal.detect_cycles();
        let cyclic = traversal.cyclic_nodes();
        let layers = traversal.topological_layers();

        let dominators: BTreeMap<NodeId, BTreeMap<NodeId, NodeId>> = entries
            .par_iter()
            .map(|entry| (entry.clone(), traversal.dominator_tree(entry)))
            .collect();

        let nesting = nesting_depths(traversal.exec(), &dominators);
        let exec_components = traversal.weak_components(LinkFlow::Exec);

        debug!(
            "Traversal of '{}': {} reachable, {} live, {} cycles, {} layers",
            graph.id(),
            reachable.len(),
            live.len(),
            cycles.cycle_count(),
            layers.len()
        );

        Self {
            entries,
            reachable,
            live,
            cycles,
            cyclic,
            layers,
            dominators,
            nesting,
            exec_components,
            exec: traversal.exec().clone(),
        }
    }

    pub fn is_reachable(&self, node: &NodeId) -> bool {
        self.reachable.contains(node)
    }

    pub fn is_live(&self, node: &NodeId) -> bool {
        self.live.contains(node)
    }

    pub fn nesting_depth(&self, node: &NodeId) -> usize {
        self.nesting.get(node).copied().unwrap_or(0)
    }

    /// Distinct exec successors of a node
    pub fn exec_successors(&self, node: &NodeId) -> usize {
        self.exec
            .index_of(node)
            .map(|i| self.exec.successors(i).len())
            .unwrap_or(0)
    }

    /// Whether every entry reaching `node` passes a strict dominator satisfying `pred`
    ///
    /// False for entries themselves and for nodes no entry reaches.
    pub fn dominated_by(&self, node: &NodeId, mut pred: impl FnMut(&NodeId) -> bool) -> bool {
        let mut reached = false;
        for (entry, tree) in &self.dominators {
            if entry == node {
                return false;
            }
            if !tree.contains_key(node) {
                continue;
            }
            reached = true;
            if !Traversal::dominators_of(tree, node).any(&mut pred) {
                return false;
            }
        }
        reached
    }
}

/// Branching strict dominators above each node, minimum over entries
fn nesting_depths(
    exec: &FlowView,
    dominators: &BTreeMap<NodeId, BTreeMap<NodeId, NodeId>>,
) -> BTreeMap<NodeId, usize> {
    let branching = |id: &NodeId| {
        exec.index_of(id)
            .map(|i| exec.successors(i).len() > 1)
            .unwrap_or(false)
    };

    let mut nesting: BTreeMap<NodeId, usize> = BTreeMap::new();
    for (entry, tree) in dominators {
        let mut record = |node: &NodeId, depth: usize| {
            nesting
                .entry(node.clone())
                .and_modify(|d| *d = (*d).min(depth))
                .or_insert(depth);
        };
        record(entry, 0);
        for node in tree.keys() {
            let depth = Traversal::dominators_of(tree, node)
                .filter(|d| branching(*d))
                .count();
            record(node, depth);
        }
    }
    nesting
}
