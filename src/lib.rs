//! blueprint-analyzer - graph analysis for visual-scripting programs
//!
//! Takes a snapshot of a node/pin/link graph, validates and indexes it,
//! computes reachability, cycles, layering and dominance over the execution
//! flow, derives complexity metrics, runs pluggable rules in parallel and
//! returns a deterministic report.
//!
//! ```ignore
//! use blueprint_analyzer::{Analyzer, AnalysisConfig, GraphSnapshot};
//!
//! let snapshot = GraphSnapshot::from_json(&json)?;
//! let report = Analyzer::new(AnalysisConfig::default()).analyze(&snapshot)?;
//! println!("{}", report.to_portable_form());
//! ```
//!
//! The library performs no file or network I/O; the `blueprint-analyzer`
//! binary does the reading and writing.

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod models;
pub mod report;
pub mod reporters;
pub mod rules;
pub mod traversal;

pub use analysis::{analyze, Analyzer};
pub use config::AnalysisConfig;
pub use error::MalformedGraph;
pub use graph::{ingest, Graph, GraphSnapshot};
pub use models::{Finding, Severity, Target};
pub use report::Report;
