//! End-to-end tests of the analysis pipeline through the public API

use anyhow::bail;
use blueprint_analyzer::graph::{LinkFlow, NodeId, NodeRecord, PinId};
use blueprint_analyzer::rules::{Rule, RuleContext, RULE_EXECUTION_FAILED};
use blueprint_analyzer::traversal::Traversal;
use blueprint_analyzer::{ingest, AnalysisConfig, Analyzer, Finding, GraphSnapshot, MalformedGraph, Severity, Target};
use std::collections::BTreeSet;
use std::sync::Arc;

fn fixture(name: &str) -> GraphSnapshot {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let content = std::fs::read_to_string(&path).unwrap();
    GraphSnapshot::from_json(&content).unwrap()
}

fn pairs(findings: &[Finding]) -> Vec<(String, String)> {
    findings
        .iter()
        .map(|f| (f.rule_id.clone(), f.target.to_string()))
        .collect()
}

#[test]
fn test_door_findings() {
    let report = Analyzer::default().analyze(&fixture("door.json")).unwrap();

    let expected: Vec<(String, String)> = [
        ("dangling-pin", "pin set_count.value"),
        ("dead-cycle", "node spin_a"),
        ("deprecated-node", "node close"),
        ("unreachable-node", "node get_open"),
        ("unreachable-node", "node orphan"),
        ("unreachable-node", "node spin_a"),
        ("unreachable-node", "node spin_b"),
    ]
    .iter()
    .map(|(r, t)| (r.to_string(), t.to_string()))
    .collect();
    assert_eq!(pairs(&report.findings), expected);
    assert_eq!(report.findings[0].severity, Severity::Error);
}

#[test]
fn test_door_metrics() {
    let report = Analyzer::default().analyze(&fixture("door.json")).unwrap();
    let m = report.graph_metrics();

    assert_eq!(m.node_count, 10);
    assert_eq!(m.link_count, 8);
    assert_eq!(m.exec_link_count, 7);
    assert_eq!(m.data_link_count, 1);
    assert_eq!(m.entry_count, 1);
    assert_eq!(m.unreachable_count, 4);
    assert_eq!(m.cycle_count, 1);
    assert_eq!(m.dead_cycle_count, 1);
    assert_eq!(m.back_edge_count, 1);
    // 7 edges - 9 exec nodes + 2 * 3 components
    assert_eq!(m.cyclomatic_complexity, 4);
    assert_eq!(m.max_nesting_depth, 1);

    let branch = report.node_metrics(&NodeId::from("branch")).unwrap();
    assert_eq!(branch.fan_out, 2);
    assert_eq!(branch.branches, 1);
}

#[test]
fn test_portable_form_is_deterministic() {
    let snapshot = fixture("door.json");
    let render = |workers: usize| {
        let config = AnalysisConfig {
            workers,
            ..Default::default()
        };
        let report = Analyzer::new(config).analyze(&snapshot).unwrap();
        serde_json::to_string(&report.to_portable_form()).unwrap()
    };

    let baseline = render(1);
    for _ in 0..3 {
        assert_eq!(render(1), baseline);
        assert_eq!(render(8), baseline);
    }
}

#[test]
fn test_no_enabled_rules() {
    let config = AnalysisConfig::from_toml_str("enabled_rules = []").unwrap();
    let report = Analyzer::new(config).analyze(&fixture("door.json")).unwrap();

    assert!(report.findings.is_empty());
    assert_eq!(report.graph_metrics().node_count, 10);
    assert_eq!(report.graph_metrics().cycle_count, 1);
    assert_eq!(report.health.score, 100.0);
}

#[test]
fn test_trivial_graph() {
    let report = Analyzer::default().analyze(&fixture("trivial.json")).unwrap();

    // The lone node is also unreachable: it has no exec links and is no entry
    assert_eq!(
        pairs(&report.findings),
        vec![
            ("unreachable-node".to_string(), "node solo".to_string()),
            ("trivial-graph".to_string(), "graph".to_string()),
        ]
    );
    assert_eq!(report.findings[1].severity, Severity::Info);
    assert!(report.findings[1].message.contains("empty or trivial graph"));
    assert_eq!(report.graph_metrics().node_count, 1);
    assert_eq!(report.graph_metrics().link_count, 0);
}

#[test]
fn test_empty_graph() {
    let report = Analyzer::default().analyze(&GraphSnapshot::new("empty")).unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].rule_id, "trivial-graph");
    assert_eq!(report.findings[0].target, Target::Graph);
}

#[test]
fn test_malformed_snapshot() {
    let err = Analyzer::default().analyze(&fixture("malformed.json")).unwrap_err();
    assert!(matches!(err, MalformedGraph::UnknownPin { .. }));
}

#[test]
fn test_isolated_node_reported_once() {
    let snapshot = GraphSnapshot::new("g")
        .with_node(NodeRecord::new("start", "Event").with_exec_pins())
        .with_node(NodeRecord::new("next", "FunctionCall").with_exec_pins())
        .with_node(NodeRecord::new("island", "FunctionCall").with_exec_pins())
        .with_link("start.then", "next.exec");
    let report = Analyzer::default().analyze(&snapshot).unwrap();

    let unreachable: Vec<&Finding> = report.findings_for_rule("unreachable-node").collect();
    assert_eq!(unreachable.len(), 1);
    assert_eq!(unreachable[0].target, Target::Node("island".into()));
}

struct PanickingRule;

impl Rule for PanickingRule {
    fn id(&self) -> &'static str {
        "always-panics"
    }

    fn description(&self) -> &'static str {
        "Panics on every graph"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, _ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        panic!("index out of bounds");
    }
}

struct FailingRule;

impl Rule for FailingRule {
    fn id(&self) -> &'static str {
        "always-fails"
    }

    fn description(&self) -> &'static str {
        "Returns an error on every graph"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, _ctx: &RuleContext) -> anyhow::Result<Vec<Finding>> {
        bail!("lookup failed")
    }
}

#[test]
fn test_rule_faults_are_isolated() {
    let snapshot = fixture("door.json");
    let baseline = Analyzer::default().analyze(&snapshot).unwrap();

    let mut analyzer = Analyzer::default();
    analyzer.register(Arc::new(PanickingRule));
    analyzer.register(Arc::new(FailingRule));
    let report = analyzer.analyze(&snapshot).unwrap();

    let failures: Vec<&Finding> = report.findings_for_rule(RULE_EXECUTION_FAILED).collect();
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.severity == Severity::Error && f.target == Target::Graph));
    assert!(failures.iter().any(|f| f.message.contains("always-panics") && f.message.contains("index out of bounds")));
    assert!(failures.iter().any(|f| f.message.contains("always-fails") && f.message.contains("lookup failed")));

    let others: Vec<Finding> = report
        .findings
        .iter()
        .filter(|f| f.rule_id != RULE_EXECUTION_FAILED)
        .cloned()
        .collect();
    assert_eq!(others, baseline.findings);
}

#[test]
fn test_unknown_rule_ids_yield_one_configuration_finding() {
    let toml = r#"
enabled_rules = ["dead-cycle", "missing-rule"]

[thresholds]
"another-missing" = 4

[rules.third-missing]
enabled = true
"#;
    let config = AnalysisConfig::from_toml_str(toml).unwrap();
    let report = Analyzer::new(config).analyze(&fixture("door.json")).unwrap();

    let configuration: Vec<&Finding> = report.findings_for_rule("configuration").collect();
    assert_eq!(configuration.len(), 1);
    assert_eq!(configuration[0].severity, Severity::Warning);
    for name in ["missing-rule", "another-missing", "third-missing"] {
        assert!(configuration[0].message.contains(name));
    }
    // Only the enabled rule ran
    assert_eq!(
        pairs(&report.findings),
        vec![
            ("configuration".to_string(), "graph".to_string()),
            ("dead-cycle".to_string(), "node spin_a".to_string()),
        ]
    );
}

#[test]
fn test_acyclic_layers_cover_every_node() {
    let snapshot = GraphSnapshot::new("g")
        .with_node(NodeRecord::new("a", "Event").with_exec_pins())
        .with_node(NodeRecord::new("b", "FunctionCall").with_exec_pins())
        .with_node(NodeRecord::new("c", "FunctionCall").with_exec_pins())
        .with_node(NodeRecord::new("d", "FunctionCall").with_exec_pins())
        .with_link("a.then", "b.exec")
        .with_link("b.then", "c.exec")
        .with_link("a.then", "d.exec");
    let graph = ingest(&snapshot).unwrap();
    let layers = Traversal::new(&graph).topological_layers();

    let mut seen = BTreeSet::new();
    for layer in &layers {
        for id in layer {
            assert!(seen.insert(id.clone()), "{} layered twice", id);
        }
    }
    assert_eq!(seen.len(), graph.node_count());
}

#[test]
fn test_reported_cycles_follow_exec_links() {
    let graph = ingest(&fixture("door.json")).unwrap();
    let report = Traversal::new(&graph).detect_cycles();

    for cycle in report.all() {
        for (i, from) in cycle.iter().enumerate() {
            let to = &cycle[(i + 1) % cycle.len()];
            let joined = graph.outgoing(from).iter().any(|link_id| {
                graph
                    .link(link_id)
                    .filter(|link| graph.flow(link) == LinkFlow::Exec)
                    .and_then(|link| graph.endpoints(link))
                    .map(|(_, target)| target == to)
                    .unwrap_or(false)
            });
            assert!(joined, "{} -> {} is not an exec link", from, to);
        }
    }
}

/// Drop every link that enters `cycle` from a node outside it, then check
/// that no entry reaches any cycle node
fn assert_cycle_cut_off(snapshot: &GraphSnapshot, cycle: &[NodeId]) {
    let graph = ingest(snapshot).unwrap();
    let members: BTreeSet<&NodeId> = cycle.iter().collect();
    let owner = |pin: &str| graph.owner_of(&PinId::from(pin)).cloned();

    let mut cut = snapshot.clone();
    cut.links.retain(|link| {
        match (owner(&link.from), owner(&link.to)) {
            (Some(from), Some(to)) => members.contains(&from) || !members.contains(&to),
            _ => true,
        }
    });

    let cut_graph = ingest(&cut).unwrap();
    let reached = Traversal::new(&cut_graph).reachable_from(cut_graph.entry_nodes());
    for node in cycle {
        assert!(!reached.contains(node), "{} still reachable after cutting its cycle off", node);
    }
}

#[test]
fn test_cycles_unreachable_once_cut_off() {
    let looped = GraphSnapshot::new("looped")
        .with_node(NodeRecord::new("A", "Event").with_exec_pins())
        .with_node(NodeRecord::new("B", "FunctionCall").with_exec_pins())
        .with_node(NodeRecord::new("C", "FunctionCall").with_exec_pins())
        .with_link("A.then", "B.exec")
        .with_link("B.then", "C.exec")
        .with_link("C.then", "B.exec");

    for snapshot in [fixture("door.json"), looped] {
        let graph = ingest(&snapshot).unwrap();
        let report = Traversal::new(&graph).detect_cycles();
        assert_eq!(report.cycle_count(), 1, "{}", snapshot.id);

        for cycle in report.all() {
            assert_cycle_cut_off(&snapshot, cycle);
        }
    }
}
