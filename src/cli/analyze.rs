//! Analyze command - read a snapshot, run the analysis, write the report

use anyhow::{Context, Result};
use blueprint_analyzer::config::CONFIG_FILE_NAMES;
use blueprint_analyzer::reporters;
use blueprint_analyzer::{AnalysisConfig, Analyzer, GraphSnapshot, Report, Severity};
use chrono::Utc;
use console::style;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct AnalyzeArgs {
    pub snapshot: PathBuf,
    pub config: Option<PathBuf>,
    pub format: String,
    pub output: Option<PathBuf>,
    pub fail_on: Option<String>,
    pub stamp: bool,
    pub workers: Option<usize>,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => discover_config(&args.snapshot),
    };
    let mut config = match &config_path {
        Some(path) => {
            info!("Using config {}", path.display());
            load_config(path)?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    let mut report = Analyzer::new(config)
        .analyze(&snapshot)
        .with_context(|| format!("Malformed graph snapshot: {}", args.snapshot.display()))?;
    if args.stamp {
        report.stamp_if_missing(Utc::now());
    }

    let rendered = reporters::report(&report, &args.format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Wrote {} report to {}",
                style("✓").green(),
                args.format,
                style(path.display()).cyan()
            );
        }
        None => print!("{}", rendered),
    }

    check_fail_threshold(args.fail_on.as_deref(), &report)
}

fn load_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    GraphSnapshot::from_json(&content)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

/// First known config file next to the snapshot
fn discover_config(snapshot: &Path) -> Option<PathBuf> {
    let dir = snapshot
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let found = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file());
    debug!("Config discovery in {}: {:?}", dir.display(), found);
    found
}

/// Load a config file; `.json` is parsed as JSON, anything else as TOML
pub(crate) fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        AnalysisConfig::from_json_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    } else {
        AnalysisConfig::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// Exit with status 1 if a finding at or above the threshold exists
fn check_fail_threshold(fail_on: Option<&str>, report: &Report) -> Result<()> {
    let Some(threshold) = fail_on else {
        return Ok(());
    };
    let severity: Severity = threshold.parse().map_err(anyhow::Error::msg)?;
    if report.has_findings_at_least(severity) {
        eprintln!(
            "{} Failing due to --fail-on={} threshold",
            style("✗").red(),
            threshold
        );
        std::process::exit(1);
    }
    Ok(())
}
