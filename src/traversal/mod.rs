//! Structural queries over the execution-flow and data-dependency views
//!
//! Both views are index-based adjacency lists over the graph's nodes in
//! ascending id order, so sorting indices is the same as sorting ids. Every
//! query here is a pure function of the graph.

pub mod cycles;
pub mod dominators;
pub mod facts;
pub mod layers;

pub use cycles::CycleReport;
pub use facts::TraversalFacts;

use crate::graph::{Graph, LinkFlow, NodeId};
use petgraph::algo::{connected_components, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Sorted, de-duplicated adjacency over one link flow
#[derive(Debug, Clone)]
pub struct FlowView {
    flow: LinkFlow,
    ids: Vec<NodeId>,
    index: FxHashMap<NodeId, usize>,
    succ: Vec<Vec<usize>>,
    pred: Vec<Vec<usize>>,
    link_count: usize,
}

impl FlowView {
    pub fn build(graph: &Graph, flow: LinkFlow) -> Self {
        let ids: Vec<NodeId> = graph.node_ids().to_vec();
        let index: FxHashMap<NodeId, usize> =
            ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();

        let mut succ = vec![Vec::new(); ids.len()];
        let mut pred = vec![Vec::new(); ids.len()];
        let mut link_count = 0;

        for link in graph.links() {
            if graph.flow(link) != flow {
                continue;
            }
            let Some((from, to)) = graph.endpoints(link) else {
                continue;
            };
            if let (Some(&u), Some(&v)) = (index.get(from), index.get(to)) {
                succ[u].push(v);
                pred[v].push(u);
                link_count += 1;
            }
        }

        for list in succ.iter_mut().chain(pred.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            flow,
            ids,
            index,
            succ,
            pred,
            link_count,
        }
    }

    pub fn flow(&self) -> LinkFlow {
        self.flow
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, index: usize) -> &NodeId {
        &self.ids[index]
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Distinct successors, ascending
    pub fn successors(&self, index: usize) -> &[usize] {
        &self.succ[index]
    }

    /// Distinct predecessors, ascending
    pub fn predecessors(&self, index: usize) -> &[usize] {
        &self.pred[index]
    }

    /// Number of links in this view, parallel links included
    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// Number of distinct node-to-node edges
    pub fn edge_count(&self) -> usize {
        self.succ.iter().map(Vec::len).sum()
    }

    pub fn has_self_loop(&self, index: usize) -> bool {
        self.succ[index].binary_search(&index).is_ok()
    }

    /// petgraph mirror of this view; node weights are view indices
    pub fn to_digraph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::with_capacity(self.len(), self.edge_count());
        for i in 0..self.len() {
            graph.add_node(i);
        }
        for (u, targets) in self.succ.iter().enumerate() {
            for &v in targets {
                graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
            }
        }
        graph
    }

    fn to_set(&self, indices: impl IntoIterator<Item = usize>) -> BTreeSet<NodeId> {
        indices.into_iter().map(|i| self.ids[i].clone()).collect()
    }
}

/// Both adjacency views of one graph
#[derive(Debug, Clone)]
pub struct Traversal<'g> {
    graph: &'g Graph,
    exec: FlowView,
    data: FlowView,
}

impl<'g> Traversal<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            exec: FlowView::build(graph, LinkFlow::Exec),
            data: FlowView::build(graph, LinkFlow::Data),
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn exec(&self) -> &FlowView {
        &self.exec
    }

    pub fn data(&self) -> &FlowView {
        &self.data
    }

    pub fn view(&self, flow: LinkFlow) -> &FlowView {
        match flow {
            LinkFlow::Exec => &self.exec,
            LinkFlow::Data => &self.data,
        }
    }

    /// Nodes reachable from `entries` along execution links, entries included
    pub fn reachable_from(&self, entries: &[NodeId]) -> BTreeSet<NodeId> {
        let roots: Vec<usize> = entries
            .iter()
            .filter_map(|id| self.exec.index_of(id))
            .collect();
        self.exec.to_set(visit(&self.exec, &roots, Direction::Forward))
    }

    /// Nodes whose data flows into `nodes`, transitively; the inputs are excluded
    pub fn data_upstream(&self, nodes: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
        let roots: Vec<usize> = nodes.iter().filter_map(|id| self.data.index_of(id)).collect();
        let found = visit(&self.data, &roots, Direction::Backward);
        self.data
            .to_set(found)
            .into_iter()
            .filter(|id| !nodes.contains(id))
            .collect()
    }

    /// Strongly connected components of a view (Tarjan), each sorted by id
    ///
    /// Components come out sorted by their smallest member.
    pub fn strongly_connected(&self, flow: LinkFlow) -> Vec<Vec<NodeId>> {
        let view = self.view(flow);
        let digraph = view.to_digraph();
        let mut components: Vec<Vec<usize>> = tarjan_scc(&digraph)
            .into_iter()
            .map(|scc| {
                let mut members: Vec<usize> = scc.into_iter().map(|n| digraph[n]).collect();
                members.sort_unstable();
                members
            })
            .collect();
        components.sort();
        components
            .into_iter()
            .map(|c| c.into_iter().map(|i| view.id(i).clone()).collect())
            .collect()
    }

    /// Number of weakly connected components of a view
    pub fn weak_components(&self, flow: LinkFlow) -> usize {
        connected_components(&self.view(flow).to_digraph())
    }

    /// Nodes that sit on an execution cycle: an SCC larger than one node, or a self-loop
    pub fn cyclic_nodes(&self) -> BTreeSet<NodeId> {
        let digraph = self.exec.to_digraph();
        let mut cyclic = BTreeSet::new();
        for scc in tarjan_scc(&digraph) {
            let looped = scc.len() == 1
                && digraph
                    .edges(scc[0])
                    .any(|edge| edge.target() == edge.source());
            if scc.len() > 1 || looped {
                cyclic.extend(scc.into_iter().map(|n| self.exec.id(digraph[n]).clone()));
            }
        }
        cyclic
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

/// Iterative DFS from `roots`, lowest index first; returns the visited set
fn visit(view: &FlowView, roots: &[usize], direction: Direction) -> Vec<usize> {
    let mut seen = vec![false; view.len()];
    let mut stack: Vec<usize> = Vec::new();

    for &root in roots {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        stack.push(root);
        while let Some(u) = stack.pop() {
            let next = match direction {
                Direction::Forward => view.successors(u),
                Direction::Backward => view.predecessors(u),
            };
            for &v in next.iter().rev() {
                if !seen[v] {
                    seen[v] = true;
                    stack.push(v);
                }
            }
        }
    }

    seen.iter()
        .enumerate()
        .filter_map(|(i, &s)| s.then_some(i))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::graph::{ingest, GraphSnapshot, NodeRecord, PinDirection, PinRecord};

    /// A(entry) -> B -> C -> B
    pub(crate) fn looped() -> Graph {
        let snapshot = GraphSnapshot::new("looped")
            .with_node(NodeRecord::new("A", "Event").with_exec_pins())
            .with_node(NodeRecord::new("B", "FunctionCall").with_exec_pins())
            .with_node(NodeRecord::new("C", "FunctionCall").with_exec_pins())
            .with_link("A.then", "B.exec")
            .with_link("B.then", "C.exec")
            .with_link("C.then", "B.exec");
        ingest(&snapshot).unwrap()
    }

    #[test]
    fn test_reachable_from() {
        let graph = looped();
        let traversal = Traversal::new(&graph);
        let reached = traversal.reachable_from(graph.entry_nodes());
        assert_eq!(reached.len(), 3);

        let only_c = traversal.reachable_from(&["C".into()]);
        let ids: Vec<&str> = only_c.iter().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["B", "C"]);
    }

    #[test]
    fn test_data_upstream() {
        let snapshot = GraphSnapshot::new("data")
            .with_node(
                NodeRecord::new("get", "VariableGet")
                    .with_pin(PinRecord::new("get.out", PinDirection::Output, "float")),
            )
            .with_node(
                NodeRecord::new("math", "Other")
                    .with_pin(PinRecord::new("math.in", PinDirection::Input, "float"))
                    .with_pin(PinRecord::new("math.out", PinDirection::Output, "float")),
            )
            .with_node(
                NodeRecord::new("call", "FunctionCall")
                    .with_pin(PinRecord::new("call.in", PinDirection::Input, "float")),
            )
            .with_link("get.out", "math.in")
            .with_link("math.out", "call.in");
        let graph = ingest(&snapshot).unwrap();
        let traversal = Traversal::new(&graph);

        let feeders = traversal.data_upstream(&BTreeSet::from(["call".into()]));
        let ids: Vec<&str> = feeders.iter().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["get", "math"]);
    }

    #[test]
    fn test_scc_and_components() {
        let graph = looped();
        let traversal = Traversal::new(&graph);

        let sccs = traversal.strongly_connected(LinkFlow::Exec);
        assert_eq!(sccs.len(), 2);
        assert_eq!(sccs[0], vec![NodeId::from("A")]);
        assert_eq!(sccs[1], vec![NodeId::from("B"), NodeId::from("C")]);

        assert_eq!(traversal.weak_components(LinkFlow::Exec), 1);
        // No data links: every node is its own component
        assert_eq!(traversal.weak_components(LinkFlow::Data), 3);

        let cyclic: Vec<String> = traversal
            .cyclic_nodes()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(cyclic, vec!["B", "C"]);
    }
}
