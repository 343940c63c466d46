//! Execution cycle detection with three-colour DFS
//!
//! Roots are tried in two phases. The entries come first (ascending id);
//! cycles closed from them are live. Then every node still unvisited is a
//! root, and cycles closed from those cannot be reached from any entry.
//!
//! A back-edge only closes the cycle on the current DFS path, so elementary
//! cycles through already finished nodes are found afterwards by walking
//! each strongly connected component from its smallest member.

use super::{FlowView, Traversal};
use crate::graph::NodeId;
use petgraph::algo::tarjan_scc;
use std::collections::BTreeSet;
use tracing::warn;

/// Upper bound on enumerated elementary cycles per graph
pub const MAX_ELEMENTARY_CYCLES: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Cycles reachable from an entry
    pub live: Vec<Vec<NodeId>>,
    /// Cycles unreachable from every entry
    pub dead: Vec<Vec<NodeId>>,
    /// `(from, to)` edges that closed a cycle, ascending
    pub back_edges: Vec<(NodeId, NodeId)>,
}

impl CycleReport {
    pub fn cycle_count(&self) -> usize {
        self.live.len() + self.dead.len()
    }

    pub fn is_acyclic(&self) -> bool {
        self.back_edges.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Vec<NodeId>> {
        self.live.iter().chain(self.dead.iter())
    }

    /// Back-edges leaving a node
    pub fn back_edges_from(&self, node: &NodeId) -> usize {
        self.back_edges.iter().filter(|(from, _)| from == node).count()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

struct CycleSearch<'v> {
    view: &'v FlowView,
    colour: Vec<Colour>,
    /// Grey nodes in DFS order; `position[n]` is n's slot while grey
    path: Vec<usize>,
    position: Vec<usize>,
    seen: BTreeSet<Vec<usize>>,
    back_edges: BTreeSet<(usize, usize)>,
}

impl<'v> CycleSearch<'v> {
    fn new(view: &'v FlowView) -> Self {
        Self {
            view,
            colour: vec![Colour::White; view.len()],
            path: Vec::new(),
            position: vec![usize::MAX; view.len()],
            seen: BTreeSet::new(),
            back_edges: BTreeSet::new(),
        }
    }

    /// Iterative DFS from `root`, appending newly closed cycles to `out`
    fn run(&mut self, root: usize, out: &mut Vec<Vec<usize>>) {
        if self.colour[root] != Colour::White {
            return;
        }
        // (node, next successor slot)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        self.enter(root);

        while let Some(frame) = stack.last_mut() {
            let (u, slot) = *frame;
            let view = self.view;
            let successors = view.successors(u);
            if slot == successors.len() {
                stack.pop();
                self.leave(u);
                continue;
            }
            frame.1 += 1;

            let v = successors[slot];
            match self.colour[v] {
                Colour::White => {
                    self.enter(v);
                    stack.push((v, 0));
                }
                Colour::Grey => {
                    self.back_edges.insert((u, v));
                    let cycle = normalize_cycle(&self.path[self.position[v]..]);
                    if self.seen.insert(cycle.clone()) {
                        out.push(cycle);
                    }
                }
                Colour::Black => {}
            }
        }
    }

    fn enter(&mut self, node: usize) {
        self.colour[node] = Colour::Grey;
        self.position[node] = self.path.len();
        self.path.push(node);
    }

    fn leave(&mut self, node: usize) {
        self.colour[node] = Colour::Black;
        self.position[node] = usize::MAX;
        self.path.pop();
    }
}

/// Rotate a cycle so that it starts at its smallest member
fn normalize_cycle(cycle: &[usize]) -> Vec<usize> {
    let min_idx = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| **v)
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut normalized = Vec::with_capacity(cycle.len());
    normalized.extend_from_slice(&cycle[min_idx..]);
    normalized.extend_from_slice(&cycle[..min_idx]);
    normalized
}

/// Elementary cycles of one strongly connected component
///
/// Each cycle starts at its smallest member and only visits larger members,
/// so every cycle comes out once, already normalised. Stops adding cycles
/// once `budget` reaches zero.
fn component_cycles(
    view: &FlowView,
    members: &[usize],
    budget: &mut usize,
    out: &mut Vec<Vec<usize>>,
) {
    let mut in_scc = vec![false; view.len()];
    for &m in members {
        in_scc[m] = true;
    }

    let mut sorted = members.to_vec();
    sorted.sort_unstable();

    for &start in &sorted {
        let mut on_path = vec![false; view.len()];
        let mut path = vec![start];
        on_path[start] = true;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (u, slot) = *frame;
            let successors = view.successors(u);
            if slot == successors.len() {
                stack.pop();
                path.pop();
                on_path[u] = false;
                continue;
            }
            frame.1 += 1;

            let v = successors[slot];
            if v == start {
                if *budget == 0 {
                    return;
                }
                *budget -= 1;
                out.push(path.clone());
            } else if v > start && in_scc[v] && !on_path[v] {
                on_path[v] = true;
                path.push(v);
                stack.push((v, 0));
            }
        }
    }
}

impl Traversal<'_> {
    pub fn detect_cycles(&self) -> CycleReport {
        let view = self.exec();
        let mut search = CycleSearch::new(view);

        let mut live = Vec::new();
        for entry in self.graph().entry_nodes() {
            if let Some(root) = view.index_of(entry) {
                search.run(root, &mut live);
            }
        }

        let mut dead = Vec::new();
        for root in 0..view.len() {
            search.run(root, &mut dead);
        }

        let reachable: BTreeSet<usize> = self
            .reachable_from(self.graph().entry_nodes())
            .iter()
            .filter_map(|id| view.index_of(id))
            .collect();
        let digraph = view.to_digraph();
        let mut budget = MAX_ELEMENTARY_CYCLES.saturating_sub(search.seen.len());
        for scc in tarjan_scc(&digraph) {
            let members: Vec<usize> = scc.into_iter().map(|n| digraph[n]).collect();
            let looped = members.len() == 1 && view.has_self_loop(members[0]);
            if members.len() < 2 && !looped {
                continue;
            }

            let mut found = Vec::new();
            component_cycles(view, &members, &mut budget, &mut found);
            let live_scc = reachable.contains(&members[0]);
            for cycle in found {
                if search.seen.insert(cycle.clone()) {
                    if live_scc {
                        live.push(cycle);
                    } else {
                        dead.push(cycle);
                    }
                }
            }
        }
        if budget == 0 {
            warn!(
                "Cycle enumeration in '{}' stopped at {} cycles",
                self.graph().id(),
                MAX_ELEMENTARY_CYCLES
            );
        }
        live.sort();
        dead.sort();

        let to_ids = |cycles: Vec<Vec<usize>>| -> Vec<Vec<NodeId>> {
            cycles
                .into_iter()
                .map(|c| c.into_iter().map(|i| view.id(i).clone()).collect())
                .collect()
        };

        CycleReport {
            live: to_ids(live),
            dead: to_ids(dead),
            back_edges: search
                .back_edges
                .iter()
                .map(|&(u, v)| (view.id(u).clone(), view.id(v).clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ingest, GraphSnapshot, NodeRecord};
    use crate::traversal::tests::looped;

    fn ids(cycle: &[NodeId]) -> Vec<&str> {
        cycle.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn test_single_live_cycle() {
        let graph = looped();
        let report = Traversal::new(&graph).detect_cycles();

        assert_eq!(report.live.len(), 1);
        assert_eq!(ids(&report.live[0]), vec!["B", "C"]);
        assert!(report.dead.is_empty());
        assert_eq!(report.back_edges, vec![("C".into(), "B".into())]);
        assert_eq!(report.back_edges_from(&"C".into()), 1);
    }

    #[test]
    fn test_dead_cycle_and_self_loop() {
        let snapshot = GraphSnapshot::new("g")
            .with_node(NodeRecord::new("entry", "Event").with_exec_pins())
            .with_node(NodeRecord::new("x", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("y", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("z", "FunctionCall").with_exec_pins())
            .with_link("y.then", "x.exec")
            .with_link("x.then", "y.exec")
            .with_link("z.then", "z.exec");
        let graph = ingest(&snapshot).unwrap();
        let report = Traversal::new(&graph).detect_cycles();

        assert!(report.live.is_empty());
        assert_eq!(report.dead.len(), 2);
        assert_eq!(ids(&report.dead[0]), vec!["x", "y"]);
        assert_eq!(ids(&report.dead[1]), vec!["z"]);
        assert_eq!(report.cycle_count(), 2);
    }

    #[test]
    fn test_cycle_through_entry_is_live() {
        let snapshot = GraphSnapshot::new("g")
            .with_node(NodeRecord::new("a", "Event").with_exec_pins())
            .with_node(NodeRecord::new("b", "FunctionCall").with_exec_pins())
            .with_link("a.then", "b.exec")
            .with_link("b.then", "a.exec");
        let graph = ingest(&snapshot).unwrap();
        let report = Traversal::new(&graph).detect_cycles();

        assert_eq!(report.live.len(), 1);
        assert_eq!(ids(&report.live[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_through_finished_node() {
        // B -> C -> B closes first; B -> D -> C -> B runs through C after it finished
        let snapshot = GraphSnapshot::new("g")
            .with_node(NodeRecord::new("A", "Event").with_exec_pins())
            .with_node(NodeRecord::new("B", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("C", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("D", "FunctionCall").with_exec_pins())
            .with_link("A.then", "B.exec")
            .with_link("B.then", "C.exec")
            .with_link("B.then", "D.exec")
            .with_link("D.then", "C.exec")
            .with_link("C.then", "B.exec");
        let graph = ingest(&snapshot).unwrap();
        let report = Traversal::new(&graph).detect_cycles();

        let live: Vec<Vec<&str>> = report.live.iter().map(|c| ids(c)).collect();
        assert_eq!(live, vec![vec!["B", "C"], vec!["B", "D", "C"]]);
        assert!(report.dead.is_empty());
        assert_eq!(report.back_edges, vec![("C".into(), "B".into())]);
    }

    #[test]
    fn test_component_cycles_respects_budget() {
        let graph = looped();
        let traversal = Traversal::new(&graph);
        let view = traversal.exec();
        let members: Vec<usize> = ["B", "C"]
            .iter()
            .filter_map(|id| view.index_of(&NodeId::from(*id)))
            .collect();

        let mut out = Vec::new();
        let mut budget = 0;
        component_cycles(view, &members, &mut budget, &mut out);
        assert!(out.is_empty());

        let mut budget = 5;
        component_cycles(view, &members, &mut budget, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(budget, 4);
    }

    #[test]
    fn test_acyclic() {
        let snapshot = GraphSnapshot::new("g")
            .with_node(NodeRecord::new("a", "Event").with_exec_pins())
            .with_node(NodeRecord::new("b", "FunctionCall").with_exec_pins())
            .with_link("a.then", "b.exec");
        let graph = ingest(&snapshot).unwrap();
        let report = Traversal::new(&graph).detect_cycles();
        assert!(report.is_acyclic());
        assert_eq!(report.cycle_count(), 0);
    }

    #[test]
    fn test_normalize_cycle() {
        assert_eq!(normalize_cycle(&[3, 1, 2]), vec![1, 2, 3]);
        assert_eq!(normalize_cycle(&[]), Vec::<usize>::new());
    }
}
