//! Rule execution engine with parallel support
//!
//! The RuleEngine evaluates every enabled rule against one analysis run:
//! - Runs rules in parallel on a dedicated rayon pool
//! - Isolates faults: an `Err` or a panic becomes one failure finding
//! - Merges per-rule results at a single point
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      RuleEngine                         │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Pick enabled rules from the registry                │
//! │  2. Evaluate each in parallel (rayon), one result each  │
//! │  3. Convert failed results to failure findings          │
//! │  4. Return the merged findings                          │
//! └─────────────────────────────────────────────────────────┘
//! ```

use super::base::{EvaluationSummary, Rule, RuleContext, RuleResult, RuleSettings};
use super::registry::RuleRegistry;
use crate::graph::Graph;
use crate::metrics::MetricSet;
use crate::models::{Finding, Severity, Target};
use crate::traversal::TraversalFacts;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Rule id of the finding recorded for a rule that failed or panicked
pub const RULE_EXECUTION_FAILED: &str = "rule-execution-failed";

/// Everything a run hands to the rules
#[derive(Clone, Copy)]
pub struct RuleInputs<'a> {
    pub graph: &'a Graph,
    pub facts: &'a TraversalFacts,
    pub metrics: &'a MetricSet,
}

/// Evaluates registered rules against one analysis run
#[derive(Debug)]
pub struct RuleEngine {
    registry: RuleRegistry,
    /// Number of worker threads for parallel execution
    workers: usize,
}

impl RuleEngine {
    /// Create an engine with no rules
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16) // Cap at 16 threads
        } else {
            workers
        };

        Self {
            registry: RuleRegistry::new(),
            workers: actual_workers,
        }
    }

    /// Engine with every built-in rule registered
    pub fn with_builtin_rules(workers: usize) -> Self {
        let mut engine = Self::new(workers);
        engine.registry = RuleRegistry::builtin();
        engine
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.registry.register(rule);
    }

    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) {
        self.registry.register_all(rules);
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// Evaluate enabled rules and return the merged findings (unsorted)
    ///
    /// Rules without an entry in `settings` run with their defaults.
    pub fn run(&self, inputs: RuleInputs<'_>, settings: &BTreeMap<String, RuleSettings>) -> Vec<Finding> {
        let start = Instant::now();
        let (results, summary) = self.run_detailed(inputs, settings);

        let mut findings = Vec::with_capacity(summary.total_findings + summary.rules_failed);
        for result in results {
            if result.success {
                findings.extend(result.findings);
            } else {
                findings.push(failure_finding(&result));
            }
        }

        info!(
            "Rule evaluation complete: {} findings from {}/{} rules in {:?}",
            findings.len(),
            summary.rules_succeeded,
            summary.rules_run,
            start.elapsed()
        );
        findings
    }

    /// Evaluate enabled rules and return one result per rule, ascending by id
    pub fn run_detailed(
        &self,
        inputs: RuleInputs<'_>,
        settings: &BTreeMap<String, RuleSettings>,
    ) -> (Vec<RuleResult>, EvaluationSummary) {
        let plan: Vec<(Arc<dyn Rule>, RuleSettings)> = self
            .registry
            .iter()
            .map(|rule| {
                let resolved = settings
                    .get(rule.id())
                    .cloned()
                    .unwrap_or_else(|| RuleSettings::defaults_for(rule.as_ref()));
                (Arc::clone(rule), resolved)
            })
            .filter(|(_, resolved)| resolved.enabled)
            .collect();

        debug!(
            "Evaluating {} of {} rules on {} workers",
            plan.len(),
            self.registry.len(),
            self.workers
        );

        let evaluate = |(rule, resolved): &(Arc<dyn Rule>, RuleSettings)| {
            let ctx = RuleContext {
                graph: inputs.graph,
                facts: inputs.facts,
                metrics: inputs.metrics,
                settings: resolved,
            };
            run_single_rule(rule.as_ref(), &ctx)
        };

        let results: Vec<RuleResult> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(|| plan.par_iter().map(evaluate).collect()),
            Err(e) => {
                warn!("Failed to build rule worker pool, evaluating sequentially: {}", e);
                plan.iter().map(evaluate).collect()
            }
        };

        let mut summary = EvaluationSummary::default();
        for result in &results {
            summary.add_result(result);
            if let Some(err) = &result.error {
                warn!("Rule {} failed: {}", result.rule_id, err);
            }
        }

        (results, summary)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_builtin_rules(0)
    }
}

/// Run a single rule with fault isolation and timing
fn run_single_rule(rule: &dyn Rule, ctx: &RuleContext<'_>) -> RuleResult {
    let id = rule.id().to_string();
    let start = Instant::now();

    debug!("Running rule: {}", id);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rule.evaluate(ctx)));
    let duration = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(findings)) => {
            debug!("Rule {} found {} findings in {}ms", id, findings.len(), duration);
            RuleResult::success(id, findings, duration)
        }
        Ok(Err(e)) => RuleResult::failure(id, format!("{:#}", e), duration),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!("Rule {} panicked: {}", id, panic_msg);
            RuleResult::failure(id, format!("panic: {}", panic_msg), duration)
        }
    }
}

/// The single finding that stands in for a failed rule
pub fn failure_finding(result: &RuleResult) -> Finding {
    let error = result.error.as_deref().unwrap_or("unknown error");
    Finding::new(
        RULE_EXECUTION_FAILED,
        Severity::Error,
        Target::Graph,
        format!("Rule '{}' failed to execute: {}", result.rule_id, error),
    )
    .with_fix(format!(
        "Disable '{}' in the configuration until the fault is fixed",
        result.rule_id
    ))
}

/// Builder for RuleEngine with fluent API
pub struct RuleEngineBuilder {
    workers: usize,
    builtin: bool,
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleEngineBuilder {
    pub fn new() -> Self {
        Self {
            workers: 0,
            builtin: true,
            rules: Vec::new(),
        }
    }

    /// Set number of worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Whether to start from the built-in rules (default: true)
    pub fn builtin(mut self, builtin: bool) -> Self {
        self.builtin = builtin;
        self
    }

    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> RuleEngine {
        let mut engine = if self.builtin {
            RuleEngine::with_builtin_rules(self.workers)
        } else {
            RuleEngine::new(self.workers)
        };
        engine.register_all(self.rules);
        engine
    }
}

impl Default for RuleEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
