//! Missing entry rule: a wired graph that nothing can start

use super::base::{Rule, RuleContext};
use crate::models::{Finding, Severity, Target};
use anyhow::Result;

pub struct MissingEntryRule;

impl Rule for MissingEntryRule {
    fn id(&self) -> &'static str {
        "missing-entry"
    }

    fn description(&self) -> &'static str {
        "Graphs that have links but no event or function entry node"
    }

    fn category(&self) -> &'static str {
        "reachability"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        if ctx.graph.link_count() == 0 || !ctx.facts.entries.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![ctx
            .finding(
                Target::Graph,
                format!(
                    "Graph has {} link(s) but no entry point, so none of it can execute",
                    ctx.graph.link_count()
                ),
            )
            .with_fix("Add an event or function entry node, or mark one node as entry")])
    }
}
