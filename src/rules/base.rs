//! Base rule trait and types
//!
//! This module defines the core abstractions for rule evaluation:
//! - `Rule` trait that all rules must implement
//! - `RuleContext` giving a rule read-only access to one analysis run
//! - `RuleSettings` holding a rule's resolved severity, thresholds and options
//! - `RuleResult` for capturing execution results

use crate::graph::Graph;
use crate::metrics::MetricSet;
use crate::models::{Finding, Severity, Target};
use crate::traversal::TraversalFacts;
use anyhow::Result;
use std::collections::BTreeMap;

/// A tunable numeric limit of a rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Metric name, as used in `"<rule-id>.<metric>"` config keys
    pub metric: &'static str,
    pub default: f64,
}

/// Result from running a single rule
#[derive(Debug, Clone)]
pub struct RuleResult {
    /// Id of the rule that produced these results
    pub rule_id: String,
    /// Findings produced by the rule
    pub findings: Vec<Finding>,
    /// Execution time in milliseconds
    pub duration_ms: u64,
    /// Whether the rule completed successfully
    pub success: bool,
    /// Error or panic message if the rule failed
    pub error: Option<String>,
}

impl RuleResult {
    pub fn success(rule_id: String, findings: Vec<Finding>, duration_ms: u64) -> Self {
        Self {
            rule_id,
            findings,
            duration_ms,
            success: true,
            error: None,
        }
    }

    /// A failed result; whatever the rule produced before failing is dropped
    pub fn failure(rule_id: String, error: String, duration_ms: u64) -> Self {
        Self {
            rule_id,
            findings: Vec::new(),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Resolved configuration of one rule for one run
#[derive(Debug, Clone)]
pub struct RuleSettings {
    pub rule_id: String,
    pub enabled: bool,
    pub severity: Severity,
    /// Metric name -> limit
    pub thresholds: BTreeMap<String, f64>,
    /// Options shared with every rule (deprecated list, fan-in policy)
    pub options: BTreeMap<String, serde_json::Value>,
}

impl RuleSettings {
    /// Enabled, default severity, default thresholds, no options
    pub fn defaults_for(rule: &dyn Rule) -> Self {
        Self {
            rule_id: rule.id().to_string(),
            enabled: true,
            severity: rule.default_severity(),
            thresholds: rule
                .thresholds()
                .iter()
                .map(|t| (t.metric.to_string(), t.default))
                .collect(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_threshold(mut self, metric: &str, value: f64) -> Self {
        self.thresholds.insert(metric.to_string(), value);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn threshold(&self, metric: &str) -> Option<f64> {
        self.thresholds.get(metric).copied()
    }

    /// Get a typed option value
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_option_or<T: serde::de::DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_option(key).unwrap_or(default)
    }
}

/// Read-only view of one analysis run, handed to every rule
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub graph: &'a Graph,
    pub facts: &'a TraversalFacts,
    pub metrics: &'a MetricSet,
    pub settings: &'a RuleSettings,
}

impl<'a> RuleContext<'a> {
    pub fn severity(&self) -> Severity {
        self.settings.severity
    }

    pub fn threshold_or(&self, metric: &str, default: f64) -> f64 {
        self.settings.threshold(metric).unwrap_or(default)
    }

    /// A finding stamped with this rule's id and resolved severity
    pub fn finding(&self, target: Target, message: impl Into<String>) -> Finding {
        Finding::new(
            self.settings.rule_id.clone(),
            self.settings.severity,
            target,
            message,
        )
    }
}

/// Trait for all graph rules
///
/// Rules inspect the graph and the facts derived from it, and report
/// findings. They never see each other's output.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct MyRule;
///
/// impl Rule for MyRule {
///     fn id(&self) -> &'static str {
///         "my-rule"
///     }
///
///     fn description(&self) -> &'static str {
///         "Flags my specific pattern"
///     }
///
///     fn default_severity(&self) -> Severity {
///         Severity::Warning
///     }
///
///     fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Unique kebab-case identifier (e.g. `dead-cycle`)
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule finds
    fn description(&self) -> &'static str;

    /// Category used for grouping in reports
    fn category(&self) -> &'static str {
        "structure"
    }

    fn default_severity(&self) -> Severity;

    /// Tunable limits; the first one is set by a bare `"<rule-id>"` threshold key
    fn thresholds(&self) -> &'static [Threshold] {
        &[]
    }

    /// Run the rule and return its findings
    fn evaluate(&self, ctx: &RuleContext) -> Result<Vec<Finding>>;
}

/// Summary statistics from running all rules
#[derive(Debug, Clone, Default)]
pub struct EvaluationSummary {
    pub rules_run: usize,
    pub rules_succeeded: usize,
    pub rules_failed: usize,
    pub total_findings: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub total_duration_ms: u64,
}

impl EvaluationSummary {
    /// Update summary with a rule result
    pub fn add_result(&mut self, result: &RuleResult) {
        self.rules_run += 1;
        self.total_duration_ms += result.duration_ms;

        if result.success {
            self.rules_succeeded += 1;
            self.total_findings += result.findings.len();

            for finding in &result.findings {
                *self.by_severity.entry(finding.severity).or_insert(0) += 1;
            }
        } else {
            self.rules_failed += 1;
        }
    }
}
