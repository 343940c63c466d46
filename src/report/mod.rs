//! Report assembly
//!
//! The builder only orders and packages what the earlier stages produced;
//! it performs no analysis of its own. The portable form uses sorted maps
//! throughout, so identical input renders to identical bytes.

mod health;

pub use health::{grade_from_score, HealthScore};

use crate::graph::{Graph, NodeId};
use crate::metrics::{GraphMetrics, MetricSet, NodeMetrics};
use crate::models::{Finding, FindingsSummary, Severity};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// The artifact of one analysis run
#[derive(Debug, Clone)]
pub struct Report {
    pub graph_id: String,
    pub graph_name: Option<String>,
    pub source: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    /// In report order
    pub findings: Vec<Finding>,
    pub summary: FindingsSummary,
    pub health: HealthScore,
    pub metrics: MetricSet,
}

impl Report {
    pub fn builder(graph: &Graph) -> ReportBuilder {
        ReportBuilder::new(graph)
    }

    pub fn graph_metrics(&self) -> &GraphMetrics {
        &self.metrics.graph
    }

    pub fn node_metrics(&self, node: &NodeId) -> Option<&NodeMetrics> {
        self.metrics.node(node)
    }

    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.graph_name.as_deref().unwrap_or(&self.graph_id)
    }

    pub fn findings_for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.rule_id == rule_id)
    }

    /// Whether any finding is at or above `severity`
    pub fn has_findings_at_least(&self, severity: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= severity)
    }

    /// Stamp a generation time if the snapshot carried none
    pub fn stamp_if_missing(&mut self, now: DateTime<Utc>) {
        if self.generated_at.is_none() {
            self.generated_at = Some(now);
        }
    }

    /// Language-neutral structured form of the report
    pub fn to_portable_form(&self) -> Value {
        json!({
            "graph_id": self.graph_id,
            "generated_at": self.generated_at.map(|t| t.to_rfc3339()),
            "metrics": {
                "graph": self.metrics.graph,
                "nodes": self.metrics.nodes,
            },
            "findings": self.findings,
            "summary": {
                "error": self.summary.error,
                "warning": self.summary.warning,
                "info": self.summary.info,
                "total": self.summary.total,
                "score": self.health.score,
                "grade": self.health.grade,
            },
        })
    }
}

/// Collects the outputs of one run into a [`Report`]
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    graph_id: String,
    graph_name: Option<String>,
    source: Option<String>,
    generated_at: Option<DateTime<Utc>>,
    metrics: MetricSet,
    findings: Vec<Finding>,
}

impl ReportBuilder {
    pub fn new(graph: &Graph) -> Self {
        let metadata = graph.metadata();
        Self {
            graph_id: graph.id().to_string(),
            graph_name: metadata.name.clone(),
            source: metadata.source.clone(),
            generated_at: metadata.timestamp,
            metrics: MetricSet::default(),
            findings: Vec::new(),
        }
    }

    pub fn metrics(mut self, metrics: MetricSet) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn finding(mut self, finding: Finding) -> Self {
        self.findings.push(finding);
        self
    }

    pub fn findings(mut self, findings: impl IntoIterator<Item = Finding>) -> Self {
        self.findings.extend(findings);
        self
    }

    pub fn generated_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.generated_at = at;
        self
    }

    pub fn build(mut self) -> Report {
        self.findings.sort_by(Finding::report_order);
        let summary = FindingsSummary::from_findings(&self.findings);
        let health = HealthScore::from_summary(&summary);

        Report {
            graph_id: self.graph_id,
            graph_name: self.graph_name,
            source: self.source,
            generated_at: self.generated_at,
            findings: self.findings,
            summary,
            health,
            metrics: self.metrics,
        }
    }
}
