//! Health score: a single 0-100 number summarising the findings

use crate::models::FindingsSummary;
use serde::Serialize;

const MAX_SCORE: f64 = 100.0;
const ERROR_PENALTY: f64 = 10.0;
const WARNING_PENALTY: f64 = 3.0;
const INFO_PENALTY: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthScore {
    pub score: f64,
    pub grade: String,
}

impl HealthScore {
    pub fn from_summary(summary: &FindingsSummary) -> Self {
        let penalty = ERROR_PENALTY * summary.error as f64
            + WARNING_PENALTY * summary.warning as f64
            + INFO_PENALTY * summary.info as f64;
        let score = (MAX_SCORE - penalty).clamp(0.0, MAX_SCORE);
        Self {
            score,
            grade: grade_from_score(score).to_string(),
        }
    }
}

/// Calculate grade from score
pub fn grade_from_score(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "A",
        s if s >= 80.0 => "B",
        s if s >= 70.0 => "C",
        s if s >= 60.0 => "D",
        _ => "F",
    }
}
