//! Analysis pipeline
//!
//! ```text
//! snapshot ─▶ ingest ─▶ traversal facts ─▶ metrics ─▶ rules ─▶ report
//! ```
//!
//! One call runs every stage over a single frozen graph. The only error a
//! caller can see is a malformed snapshot; everything after ingestion ends
//! in a complete report.

use crate::config::AnalysisConfig;
use crate::error::MalformedGraph;
use crate::graph::{ingest_with, GraphSnapshot};
use crate::metrics;
use crate::report::Report;
use crate::rules::{Rule, RuleEngine, RuleInputs};
use crate::traversal::TraversalFacts;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runs the full pipeline with one configuration
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
    engine: RuleEngine,
}

impl Analyzer {
    /// Analyzer with every built-in rule
    pub fn new(config: AnalysisConfig) -> Self {
        let engine = RuleEngine::with_builtin_rules(config.workers);
        Self { config, engine }
    }

    /// Analyzer around a prepared engine (custom rule sets)
    pub fn with_engine(config: AnalysisConfig, engine: RuleEngine) -> Self {
        Self { config, engine }
    }

    /// Register an additional rule
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.engine.register(rule);
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn analyze(&self, snapshot: &GraphSnapshot) -> Result<Report, MalformedGraph> {
        let start = Instant::now();
        let resolved = self.config.resolve(self.engine.registry());

        let graph = ingest_with(snapshot, resolved.ingest)?;
        info!(
            "Analyzing '{}': {} nodes, {} pins, {} links",
            graph.id(),
            graph.node_count(),
            graph.pin_count(),
            graph.link_count()
        );

        let facts = TraversalFacts::compute(&graph);
        let metrics = metrics::collect(&graph, &facts);

        let inputs = RuleInputs {
            graph: &graph,
            facts: &facts,
            metrics: &metrics,
        };
        let mut findings = self.engine.run(inputs, &resolved.settings);
        findings.extend(resolved.configuration_finding());

        let report = Report::builder(&graph)
            .metrics(metrics)
            .findings(findings)
            .build();

        info!(
            "Analysis of '{}' complete in {:?}: {} findings, score {:.0} ({})",
            report.graph_id,
            start.elapsed(),
            report.summary.total,
            report.health.score,
            report.health.grade
        );
        Ok(report)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

/// Analyze a snapshot with the built-in rules
pub fn analyze(snapshot: &GraphSnapshot, config: &AnalysisConfig) -> Result<Report, MalformedGraph> {
    Analyzer::new(config.clone()).analyze(snapshot)
}
