//! Excessive complexity rule
//!
//! Two limits: graph cyclomatic complexity, and the per-node complexity
//! score from the metric collector.

use super::base::{Rule, RuleContext, Threshold};
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

const CYCLOMATIC: &str = "cyclomatic";
const NODE_SCORE: &str = "node-score";

const DEFAULT_CYCLOMATIC: f64 = 10.0;
const DEFAULT_NODE_SCORE: f64 = 8.0;

pub struct ExcessiveComplexityRule;

impl Rule for ExcessiveComplexityRule {
    fn id(&self) -> &'static str {
        "excessive-complexity"
    }

    fn description(&self) -> &'static str {
        "Graph cyclomatic complexity or node complexity score above threshold"
    }

    fn category(&self) -> &'static str {
        "complexity"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn thresholds(&self) -> &'static [Threshold] {
        &[
            Threshold {
                metric: CYCLOMATIC,
                default: DEFAULT_CYCLOMATIC,
            },
            Threshold {
                metric: NODE_SCORE,
                default: DEFAULT_NODE_SCORE,
            },
        ]
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        let cyclomatic_limit = ctx.threshold_or(CYCLOMATIC, DEFAULT_CYCLOMATIC);
        let cyclomatic = ctx.metrics.graph.cyclomatic_complexity;
        if cyclomatic as f64 > cyclomatic_limit {
            findings.push(
                ctx.finding(
                    Target::Graph,
                    format!(
                        "Cyclomatic complexity {} exceeds the limit of {}",
                        cyclomatic, cyclomatic_limit
                    ),
                )
                .with_fix("Split the graph into functions or collapse branches into macros"),
            );
        }

        let score_limit = ctx.threshold_or(NODE_SCORE, DEFAULT_NODE_SCORE);
        for (id, metrics) in &ctx.metrics.nodes {
            if metrics.complexity > score_limit {
                findings.push(
                    ctx.finding(
                        Target::Node(id.clone()),
                        format!(
                            "Node complexity score {:.1} exceeds the limit of {} ({} branches, {} back-edges, fan-in {}, fan-out {})",
                            metrics.complexity,
                            score_limit,
                            metrics.branches,
                            metrics.back_edges,
                            metrics.fan_in,
                            metrics.fan_out
                        ),
                    )
                    .with_fix("Move part of this node's control flow into a separate function"),
                );
            }
        }

        Ok(findings)
    }
}
