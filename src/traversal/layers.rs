//! Kahn layering of the acyclic part of the execution view

use super::Traversal;
use crate::graph::NodeId;
use std::collections::BTreeSet;

impl Traversal<'_> {
    /// Topological layers over nodes that are not on an execution cycle
    ///
    /// Layer 0 holds every acyclic node without an acyclic exec predecessor,
    /// data-only nodes included. Links leaving a cyclic node do not count
    /// towards in-degree, so every acyclic node lands in exactly one layer.
    pub fn topological_layers(&self) -> Vec<BTreeSet<NodeId>> {
        let view = self.exec();
        let cyclic = self.cyclic_nodes();
        let on_cycle: Vec<bool> = (0..view.len())
            .map(|i| cyclic.contains(view.id(i)))
            .collect();

        let mut in_degree = vec![0usize; view.len()];
        for u in (0..view.len()).filter(|&u| !on_cycle[u]) {
            for &v in view.successors(u) {
                if !on_cycle[v] {
                    in_degree[v] += 1;
                }
            }
        }

        let mut layers = Vec::new();
        let mut current: Vec<usize> = (0..view.len())
            .filter(|&i| !on_cycle[i] && in_degree[i] == 0)
            .collect();

        while !current.is_empty() {
            let mut next = Vec::new();
            for &u in &current {
                for &v in view.successors(u) {
                    if on_cycle[v] {
                        continue;
                    }
                    in_degree[v] -= 1;
                    if in_degree[v] == 0 {
                        next.push(v);
                    }
                }
            }
            layers.push(current.iter().map(|&i| view.id(i).clone()).collect());
            next.sort_unstable();
            current = next;
        }

        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ingest, GraphSnapshot, NodeRecord, PinDirection, PinRecord};
    use crate::traversal::tests::looped;

    fn layer_ids(layers: &[BTreeSet<NodeId>]) -> Vec<Vec<&str>> {
        layers
            .iter()
            .map(|l| l.iter().map(NodeId::as_str).collect())
            .collect()
    }

    #[test]
    fn test_cyclic_nodes_are_not_layered() {
        let graph = looped();
        let layers = Traversal::new(&graph).topological_layers();
        assert_eq!(layer_ids(&layers), vec![vec!["A"]]);
    }

    #[test]
    fn test_diamond_covers_every_node_once() {
        let snapshot = GraphSnapshot::new("diamond")
            .with_node(NodeRecord::new("a", "Event").with_exec_pins())
            .with_node(
                NodeRecord::new("b", "Branch")
                    .with_exec_pins()
                    .with_pin(PinRecord::new("b.else", PinDirection::Output, "exec")),
            )
            .with_node(NodeRecord::new("c", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("d", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("e", "FunctionCall").with_exec_pins())
            .with_node(
                NodeRecord::new("v", "VariableGet")
                    .with_pin(PinRecord::new("v.out", PinDirection::Output, "bool")),
            )
            .with_link("a.then", "b.exec")
            .with_link("b.then", "c.exec")
            .with_link("b.else", "d.exec")
            .with_link("c.then", "e.exec")
            .with_link("d.then", "e.exec");
        let graph = ingest(&snapshot).unwrap();
        let layers = Traversal::new(&graph).topological_layers();

        assert_eq!(
            layer_ids(&layers),
            vec![vec!["a", "v"], vec!["b"], vec!["c", "d"], vec!["e"]]
        );
        let total: usize = layers.iter().map(BTreeSet::len).sum();
        assert_eq!(total, graph.node_count());
    }

    #[test]
    fn test_node_after_cycle_is_layered() {
        let snapshot = GraphSnapshot::new("g")
            .with_node(NodeRecord::new("a", "Event").with_exec_pins())
            .with_node(
                NodeRecord::new("b", "Loop")
                    .with_exec_pins()
                    .with_pin(PinRecord::new("b.done", PinDirection::Output, "exec")),
            )
            .with_node(NodeRecord::new("c", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("d", "FunctionCall").with_exec_pins())
            .with_link("a.then", "b.exec")
            .with_link("b.then", "c.exec")
            .with_link("c.then", "b.exec")
            .with_link("b.done", "d.exec");
        let graph = ingest(&snapshot).unwrap();
        let layers = Traversal::new(&graph).topological_layers();

        assert_eq!(layer_ids(&layers), vec![vec!["a", "d"]]);
    }
}
