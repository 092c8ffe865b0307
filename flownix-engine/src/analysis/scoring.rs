//! Composite data-quality score.

use std::fmt;

use serde::Serialize;

use super::quality::{Duplicates, MissingValues};
use super::round_to;
use crate::table::Table;

pub const COMPLETENESS_WEIGHT: f64 = 0.5;
pub const UNIQUENESS_WEIGHT: f64 = 0.5;

pub const EXCELLENT_THRESHOLD: f64 = 90.0;
pub const GOOD_THRESHOLD: f64 = 75.0;
pub const FAIR_THRESHOLD: f64 = 50.0;

/// Qualitative band of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            QualityLevel::Excellent
        } else if score >= GOOD_THRESHOLD {
            QualityLevel::Good
        } else if score >= FAIR_THRESHOLD {
            QualityLevel::Fair
        } else {
            QualityLevel::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Poor => "poor",
            QualityLevel::Fair => "fair",
            QualityLevel::Good => "good",
            QualityLevel::Excellent => "excellent",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `data_quality` report section. Scores are in `[0, 100]`, 2 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    pub overall_score: f64,
    pub completeness_score: f64,
    pub uniqueness_score: f64,
    pub quality_level: QualityLevel,
}

/// `100 * (1 - part / whole)` clamped to `[0, 100]`; 100 when `whole` is 0.
fn complement_score(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    (100.0 * (1.0 - part as f64 / whole as f64)).clamp(0.0, 100.0)
}

/// Scores a table from its missingness and duplication profiles.
pub fn score(missing: &MissingValues, duplicates: &Duplicates, table: &Table) -> DataQuality {
    let completeness = complement_score(missing.total_missing, table.total_cells());
    let uniqueness = complement_score(duplicates.duplicate_rows, table.row_count());
    let overall = round_to(
        COMPLETENESS_WEIGHT * completeness + UNIQUENESS_WEIGHT * uniqueness,
        2,
    );

    DataQuality {
        overall_score: overall,
        completeness_score: round_to(completeness, 2),
        uniqueness_score: round_to(uniqueness, 2),
        quality_level: QualityLevel::from_score(overall),
    }
}
