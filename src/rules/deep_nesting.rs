use super::base::{Rule, RuleContext, Threshold};
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

const DEPTH: &str = "depth";
const DEFAULT_DEPTH: f64 = 5.0;

/// Nodes nested under too many branching levels
pub struct DeepNestingRule;

impl Rule for DeepNestingRule {
    fn id(&self) -> &'static str {
        "deep-nesting"
    }

    fn description(&self) -> &'static str {
        "Nodes nested more branching levels deep than the threshold"
    }

    fn category(&self) -> &'static str {
        "complexity"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn thresholds(&self) -> &'static [Threshold] {
        &[Threshold {
            metric: DEPTH,
            default: DEFAULT_DEPTH,
        }]
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let limit = ctx.threshold_or(DEPTH, DEFAULT_DEPTH);
        Ok(ctx
            .metrics
            .nodes
            .iter()
            .filter(|(_, m)| m.nesting_depth as f64 > limit)
            .map(|(id, m)| {
                ctx.finding(
                    Target::Node(id.clone()),
                    format!(
                        "Node is nested {} levels deep (max recommended: {})",
                        m.nesting_depth, limit
                    ),
                )
                .with_fix("Flatten the branches or extract the nested logic into a function")
            })
            .collect())
    }
}
