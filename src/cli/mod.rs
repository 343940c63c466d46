//! CLI command definitions and handlers

mod analyze;
mod init;
mod rules;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (0-64, 0 = auto)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Static analysis for visual-scripting graphs
#[derive(Parser, Debug)]
#[command(name = "blueprint-analyzer")]
#[command(
    version,
    about = "Graph analysis for visual-scripting blueprints: reachability, cycles, complexity and rule checks",
    after_help = "\
Examples:
  blueprint-analyzer analyze BP_Door.json                   JSON report on stdout
  blueprint-analyzer analyze BP_Door.json --format text     Plain text summary
  blueprint-analyzer analyze BP_Door.json --fail-on error   Exit code 1 on errors (CI mode)
  blueprint-analyzer rules                                  List built-in rules
  blueprint-analyzer init                                   Write a starter config"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of rule worker threads (0 = auto, overrides the config file)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a graph snapshot
    #[command(after_help = "\
Without --config, blueprint-analyzer.toml and then .blueprint-analyzer.json
are looked up next to the snapshot.")]
    Analyze {
        /// Snapshot document (JSON)
        snapshot: PathBuf,

        /// Configuration file (.toml or .json)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format: json, text, markdown (or md)
        #[arg(long, short = 'f', default_value = "json", value_parser = ["json", "text", "markdown", "md"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit with code 1 if findings at this severity or higher exist
        #[arg(long, value_parser = ["info", "warning", "error"])]
        fail_on: Option<String>,

        /// Use the current time as generated_at when the snapshot has no timestamp
        #[arg(long)]
        stamp: bool,
    },

    /// List built-in rules with their severity and description
    Rules,

    /// Write a commented blueprint-analyzer.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            snapshot,
            config,
            format,
            output,
            fail_on,
            stamp,
        } => analyze::run(analyze::AnalyzeArgs {
            snapshot,
            config,
            format,
            output,
            fail_on,
            stamp,
            workers: cli.workers,
        }),
        Commands::Rules => rules::run(),
        Commands::Init { dir } => init::run(&dir),
    }
}
