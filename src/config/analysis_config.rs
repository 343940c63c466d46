//! Analysis configuration
//!
//! Parsed from `blueprint-analyzer.toml` or `.blueprint-analyzer.json` by the
//! binary; the library only ever sees the parsed value.
//!
//! # Configuration Format
//!
//! ```toml
//! # blueprint-analyzer.toml
//!
//! # Rules to run (default: every built-in rule)
//! enabled_rules = ["unreachable-node", "dead-cycle", "excessive-complexity"]
//!
//! deprecated_nodes = ["K2Node_Timeline", "GetAllActorsOfClass"]
//! exec_fan_in = "warn"   # allow | warn | reject
//! workers = 0            # 0 = auto
//!
//! # "<rule-id>" sets the rule's primary threshold,
//! # "<rule-id>.<metric>" a specific one
//! [thresholds]
//! "excessive-complexity" = 15
//! "excessive-complexity.node-score" = 10.0
//! "deep-nesting.depth" = 4
//!
//! [rules.dangling-pin]
//! severity = "warning"
//!
//! [rules.deep-nesting]
//! enabled = false
//! ```
//!
//! Unknown rule ids, unknown metrics, non-numeric thresholds and invalid
//! severities never fail the run. They are collected by [`AnalysisConfig::resolve`]
//! and surface as a single `configuration` finding.

use crate::graph::{FanInPolicy, IngestOptions};
use crate::models::{kebab_case, Finding, Severity, Target};
use crate::rules::{Rule, RuleRegistry, RuleSettings, OPTION_DEPRECATED_NODES, OPTION_EXEC_FAN_IN};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Rule id of the finding that lists ignored configuration entries
pub const CONFIGURATION: &str = "configuration";

/// Top-level analysis configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    /// Rules to run; `None` runs every registered rule
    #[serde(default)]
    pub enabled_rules: Option<Vec<String>>,

    /// `"<rule-id>"` or `"<rule-id>.<metric>"` -> limit
    #[serde(default)]
    pub thresholds: BTreeMap<String, ThresholdValue>,

    /// Per-rule overrides
    #[serde(default)]
    pub rules: BTreeMap<String, RuleOverride>,

    /// Node kinds or function names reported by `deprecated-node`
    #[serde(default)]
    pub deprecated_nodes: Vec<String>,

    /// Treatment of exec input pins with several incoming links
    #[serde(default)]
    pub exec_fan_in: FanInPolicy,

    /// Rule worker threads (0 = auto)
    #[serde(default)]
    pub workers: usize,
}

/// Configuration override for a single rule
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleOverride {
    /// Whether the rule runs (default: unchanged)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Override the default severity (info, warning, error)
    #[serde(default)]
    pub severity: Option<String>,

    /// Metric -> limit
    #[serde(default)]
    pub thresholds: BTreeMap<String, ThresholdValue>,
}

/// A threshold value as written in the config file
///
/// Only numbers are meaningful; other values are kept so they can be
/// reported instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl ThresholdValue {
    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v as f64),
            ThresholdValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThresholdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdValue::Integer(v) => write!(f, "{}", v),
            ThresholdValue::Float(v) => write!(f, "{}", v),
            ThresholdValue::Boolean(v) => write!(f, "{}", v),
            ThresholdValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Settings of every registered rule, ready for the engine
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub settings: BTreeMap<String, RuleSettings>,
    pub ingest: IngestOptions,
    /// Ignored entries, in the order they were found
    pub issues: Vec<String>,
}

impl ResolvedConfig {
    /// The single `configuration` finding, if anything was ignored
    pub fn configuration_finding(&self) -> Option<Finding> {
        if self.issues.is_empty() {
            return None;
        }
        Some(
            Finding::new(
                CONFIGURATION,
                Severity::Warning,
                Target::Graph,
                format!(
                    "Ignored {} configuration entr{}: {}",
                    self.issues.len(),
                    if self.issues.len() == 1 { "y" } else { "ies" },
                    self.issues.join("; ")
                ),
            )
            .with_fix("Check rule ids with `blueprint-analyzer rules`"),
        )
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            exec_fan_in: self.exec_fan_in,
        }
    }

    /// Resolve this configuration against the registered rules
    pub fn resolve(&self, registry: &RuleRegistry) -> ResolvedConfig {
        let mut issues = Vec::new();
        let shared = self.shared_options();

        let mut settings: BTreeMap<String, RuleSettings> = registry
            .iter()
            .map(|rule| {
                let mut resolved = RuleSettings::defaults_for(rule.as_ref());
                resolved.options = shared.clone();
                (rule.id().to_string(), resolved)
            })
            .collect();

        if let Some(enabled) = &self.enabled_rules {
            for resolved in settings.values_mut() {
                resolved.enabled = false;
            }
            for name in enabled {
                let id = normalize_rule_id(name);
                match settings.get_mut(&id) {
                    Some(resolved) => resolved.enabled = true,
                    None => issues.push(format!("unknown rule '{}' in enabled_rules", name)),
                }
            }
        }

        for (key, value) in &self.thresholds {
            let (name, metric) = match key.split_once('.') {
                Some((name, metric)) => (name, Some(metric)),
                None => (key.as_str(), None),
            };
            let id = normalize_rule_id(name);
            let Some(rule) = registry.get(&id) else {
                issues.push(format!("unknown rule '{}' in thresholds", name));
                continue;
            };
            if let Some(resolved) = settings.get_mut(&id) {
                apply_threshold(rule.as_ref(), resolved, key, metric, value, &mut issues);
            }
        }

        for (name, over) in &self.rules {
            let id = normalize_rule_id(name);
            let (Some(rule), Some(resolved)) = (registry.get(&id), settings.get_mut(&id)) else {
                issues.push(format!("unknown rule '{}' in [rules]", name));
                continue;
            };
            if let Some(enabled) = over.enabled {
                resolved.enabled = enabled;
            }
            if let Some(severity) = &over.severity {
                match severity.parse::<Severity>() {
                    Ok(severity) => resolved.severity = severity,
                    Err(_) => issues.push(format!("invalid severity '{}' for rule '{}'", severity, id)),
                }
            }
            for (metric, value) in &over.thresholds {
                let key = format!("{}.{}", id, metric);
                apply_threshold(rule.as_ref(), resolved, &key, Some(metric), value, &mut issues);
            }
        }

        for issue in &issues {
            warn!("Configuration: {}", issue);
        }
        debug!(
            "Resolved configuration: {} of {} rules enabled",
            settings.values().filter(|s| s.enabled).count(),
            settings.len()
        );

        ResolvedConfig {
            settings,
            ingest: self.ingest_options(),
            issues,
        }
    }

    /// Options handed to every rule
    fn shared_options(&self) -> BTreeMap<String, serde_json::Value> {
        let mut options = BTreeMap::new();
        options.insert(
            OPTION_DEPRECATED_NODES.to_string(),
            serde_json::Value::from(self.deprecated_nodes.clone()),
        );
        let policy = match self.exec_fan_in {
            FanInPolicy::Allow => "allow",
            FanInPolicy::Warn => "warn",
            FanInPolicy::Reject => "reject",
        };
        options.insert(OPTION_EXEC_FAN_IN.to_string(), serde_json::Value::from(policy));
        options
    }
}

/// Set one threshold, or record why it was ignored
fn apply_threshold(
    rule: &dyn Rule,
    resolved: &mut RuleSettings,
    key: &str,
    metric: Option<&str>,
    value: &ThresholdValue,
    issues: &mut Vec<String>,
) {
    let metric = match metric {
        Some(metric) => {
            let metric = kebab_case(metric);
            match rule.thresholds().iter().find(|t| t.metric == metric) {
                Some(threshold) => threshold.metric,
                None => {
                    issues.push(format!("unknown metric '{}' for rule '{}'", metric, rule.id()));
                    return;
                }
            }
        }
        None => match rule.thresholds().first() {
            Some(threshold) => threshold.metric,
            None => {
                issues.push(format!("rule '{}' has no thresholds", rule.id()));
                return;
            }
        },
    };

    match value.as_f64() {
        Some(limit) => {
            resolved.thresholds.insert(metric.to_string(), limit);
        }
        None => issues.push(format!("threshold '{}' is not a number: {}", key, value)),
    }
}

/// Normalize a rule name to its registry id
///
/// `DeadCycle`, `dead_cycle`, `DeadCycleRule` -> `dead-cycle`
pub fn normalize_rule_id(name: &str) -> String {
    let id = kebab_case(name);
    match id.strip_suffix("-rule") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => id,
    }
}
