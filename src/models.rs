//! Core data models shared across the analyzer
//!
//! These models are used by the rule engine, the report builder and the
//! reporters for representing findings and their targets.

use crate::graph::{LinkId, NodeId, PinId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Normalize an identifier to kebab-case
///
/// `DeadCycle`, `dead_cycle` and `dead-cycle` all become `dead-cycle`;
/// acronyms stay together (`SQLInjection` -> `sql-injection`).
pub fn kebab_case(name: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = name.trim().chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_is_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else if *c == '_' || *c == ' ' {
            result.push('-');
        } else {
            result.push(*c);
        }
    }

    result
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            other => Err(format!(
                "Unknown severity '{}'. Valid severities: info, warning, error",
                other
            )),
        }
    }
}

/// The entity a finding points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Target {
    Graph,
    Node(NodeId),
    Pin(PinId),
    Link(LinkId),
}

impl Target {
    /// Id used for ordering findings; graph-level targets sort first
    pub fn sort_key(&self) -> &str {
        match self {
            Target::Graph => "",
            Target::Node(id) => id.as_str(),
            Target::Pin(id) => id.as_str(),
            Target::Link(id) => id.as_str(),
        }
    }

    /// Node id if this finding targets a node
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Target::Node(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Graph => write!(f, "graph"),
            Target::Node(id) => write!(f, "node {}", id),
            Target::Pin(id) => write!(f, "pin {}", id),
            Target::Link(id) => write!(f, "link {}", id),
        }
    }
}

/// One reported defect or observation produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub target: Target,
    pub message: String,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        target: Target,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            target,
            message: message.into(),
            suggested_fix: None,
        }
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// Report order: severity (desc), rule id, target id, then message
    pub fn report_order(a: &Finding, b: &Finding) -> Ordering {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.rule_id.cmp(&b.rule_id))
            .then_with(|| a.target.sort_key().cmp(b.target.sort_key()))
            .then_with(|| a.message.cmp(&b.message))
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::Error => summary.error += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
            summary.total += 1;
        }
        summary
    }
}
