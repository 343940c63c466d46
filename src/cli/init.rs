//! Init command - write a starter configuration file

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const CONFIG_FILE: &str = "blueprint-analyzer.toml";

const DEFAULT_CONFIG: &str = r#"# blueprint-analyzer configuration
# Rule ids: run `blueprint-analyzer rules`

# Rules to run (omit to run every built-in rule)
# enabled_rules = ["unreachable-node", "dead-cycle", "dangling-pin"]

# Node kinds or function names reported by `deprecated-node`
deprecated_nodes = []

# Exec input pins with several incoming links: allow | warn | reject
exec_fan_in = "warn"

# Rule worker threads (0 = auto)
workers = 0

# "<rule-id>" sets the primary threshold, "<rule-id>.<metric>" a specific one
[thresholds]
"excessive-complexity.cyclomatic" = 10
"excessive-complexity.node-score" = 8.0
"deep-nesting.depth" = 5

# Per-rule overrides
# [rules.trivial-graph]
# enabled = false
#
# [rules.dangling-pin]
# severity = "warning"
"#;

/// Run the init command
pub fn run(dir: &Path) -> Result<()> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", dir.display()))?;
    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        println!(
            "{} {} already exists, leaving it untouched",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_analyzer::rules::RuleRegistry;
    use blueprint_analyzer::AnalysisConfig;

    #[test]
    fn test_default_config_resolves_cleanly() {
        let config = AnalysisConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        let resolved = config.resolve(&RuleRegistry::builtin());
        assert!(resolved.issues.is_empty(), "{:?}", resolved.issues);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "workers = 2\n").unwrap();

        run(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "workers = 2\n");
    }
}
