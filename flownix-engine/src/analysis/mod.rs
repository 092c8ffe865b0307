//! Profiling components.
//!
//! Each submodule is a pure function of an immutable [`Table`](crate::table::Table)
//! (and, where needed, of the outputs of earlier stages). They are sequenced by
//! the [`AnalysisOrchestrator`](crate::orchestrator::AnalysisOrchestrator):
//!
//! 1. [`classifier`] assigns every column a semantic class
//! 2. [`quality`] measures missingness, duplication and memory footprint
//! 3. [`statistics`] computes per-class descriptive statistics
//! 4. [`correlation`] reports strongly correlated numeric pairs
//! 5. [`scoring`] folds the quality profile into a composite score

pub mod classifier;
pub mod correlation;
pub mod quality;
pub mod scoring;
pub mod statistics;

pub use classifier::{classify, Classification, ColumnClass, ColumnTypes};
pub use correlation::{find_correlations, pearson, HighCorrelation, CORRELATION_THRESHOLD};
pub use quality::{Duplicates, MemoryUsage, MissingValues, QualityProfile};
pub use scoring::{DataQuality, QualityLevel};
pub use statistics::{
    compute_statistics, Cardinality, CategoricalStats, DatetimeStats, NumericStats, Statistics,
    ValueCount,
};

/// Rounds half away from zero to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
