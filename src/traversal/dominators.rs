//! Immediate dominators over the execution view
//!
//! Uses petgraph's Cooper-Harvey-Kennedy implementation
//! (`dominators::simple_fast`), which iterates to a fixpoint over reverse
//! postorder.

use super::Traversal;
use crate::graph::NodeId;
use petgraph::algo::dominators::simple_fast;
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

impl Traversal<'_> {
    /// Immediate dominator of every node reachable from `entry`
    ///
    /// The entry itself is absent, as is every node it cannot reach. Returns
    /// an empty map for an unknown entry.
    pub fn dominator_tree(&self, entry: &NodeId) -> BTreeMap<NodeId, NodeId> {
        let view = self.exec();
        let Some(root) = view.index_of(entry) else {
            return BTreeMap::new();
        };

        let digraph = view.to_digraph();
        let dominators = simple_fast(&digraph, NodeIndex::new(root));

        let mut tree = BTreeMap::new();
        for i in 0..view.len() {
            if i == root {
                continue;
            }
            if let Some(idom) = dominators.immediate_dominator(NodeIndex::new(i)) {
                tree.insert(view.id(i).clone(), view.id(idom.index()).clone());
            }
        }
        tree
    }

    /// Strict dominators of `node`, nearest first, ending at the entry
    pub fn dominators_of<'t>(
        tree: &'t BTreeMap<NodeId, NodeId>,
        node: &NodeId,
    ) -> impl Iterator<Item = &'t NodeId> + 't {
        let mut current = tree.get(node);
        std::iter::from_fn(move || {
            let here = current?;
            current = tree.get(here);
            Some(here)
        })
    }
}
