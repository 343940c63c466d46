//! Configuration module for the analyzer
//!
//! This module handles:
//! - Rule selection (`enabled_rules`)
//! - Threshold and severity overrides
//! - Shared rule options (deprecated list, exec fan-in policy)

mod analysis_config;

pub use analysis_config::{
    normalize_rule_id,
    AnalysisConfig,
    ResolvedConfig,
    RuleOverride,
    ThresholdValue,
    CONFIGURATION,
};

/// Config file names looked up next to a snapshot, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["blueprint-analyzer.toml", ".blueprint-analyzer.json"];
