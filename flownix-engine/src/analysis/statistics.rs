//! Per-column descriptive statistics, dispatched by [`ColumnClass`].
//!
//! Formulas:
//!
//! - standard deviation is the **sample** standard deviation (divisor `n - 1`)
//! - percentiles use linear interpolation between closest ranks
//!   (position `q * (n - 1)` in the sorted values)
//! - skewness is the adjusted Fisher-Pearson coefficient `G1`
//! - kurtosis is the bias-corrected excess kurtosis `G2`
//!
//! Statistics that need more observations than a column has are reported as
//! absent rather than as NaN.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use super::classifier::{Classification, ColumnClass};
use crate::table::{Column, Table, ISO_DATETIME_FORMAT};

/// Number of most frequent values reported for a categorical column.
pub const TOP_VALUES_LIMIT: usize = 5;
/// Above this many distinct values a categorical column is high-cardinality.
pub const HIGH_CARDINALITY_UNIQUE: usize = 50;
/// Above this share of rows being distinct a categorical column is high-cardinality.
pub const HIGH_CARDINALITY_RATIO: f64 = 0.5;
/// At or below this many distinct values a categorical column is low-cardinality.
pub const LOW_CARDINALITY_UNIQUE: usize = 10;

/// Descriptive statistics of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    /// Non-missing observations
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub zeros_count: usize,
    pub negative_count: usize,
}

/// One entry of a categorical frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Cardinality band of a categorical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Low,
    Medium,
    High,
}

impl Cardinality {
    /// High is tested first: more than 50 distinct values, or distinct values
    /// covering more than half of the rows. Otherwise 10 or fewer is low.
    pub fn classify(unique_values: usize, row_count: usize) -> Self {
        if unique_values > HIGH_CARDINALITY_UNIQUE
            || unique_values as f64 > row_count as f64 * HIGH_CARDINALITY_RATIO
        {
            Cardinality::High
        } else if unique_values <= LOW_CARDINALITY_UNIQUE {
            Cardinality::Low
        } else {
            Cardinality::Medium
        }
    }
}

/// Frequency statistics of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalStats {
    pub unique_values: usize,
    /// Most frequent values, count descending, ties in first-seen order
    pub top_values: Vec<ValueCount>,
    pub cardinality: Cardinality,
}

/// Range statistics of a datetime column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatetimeStats {
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub range_days: Option<i64>,
}

/// The `statistics` report section. Boolean columns have no bucket.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub numeric: BTreeMap<String, NumericStats>,
    pub categorical: BTreeMap<String, CategoricalStats>,
    pub datetime: BTreeMap<String, DatetimeStats>,
}

/// Computes statistics for every non-boolean column according to its class.
pub fn compute_statistics(table: &Table, classification: &Classification) -> Statistics {
    let mut stats = Statistics::default();

    let classified = table
        .columns()
        .iter()
        .zip(classification.iter())
        .filter(|(column, (name, _))| column.name() == *name);
    for (column, (_, class)) in classified {
        let name = column.name().to_string();
        match class {
            ColumnClass::Numeric => {
                stats.numeric.insert(name, numeric_stats(column));
            }
            ColumnClass::Categorical => {
                stats
                    .categorical
                    .insert(name, categorical_stats(column, table.row_count()));
            }
            ColumnClass::Datetime => {
                stats.datetime.insert(name, datetime_stats(column));
            }
            ColumnClass::Boolean => {}
        }
    }

    debug!(
        numeric = stats.numeric.len(),
        categorical = stats.categorical.len(),
        datetime = stats.datetime.len(),
        "Computed column statistics"
    );

    stats
}

/// Linear-interpolation percentile of already sorted values; `q` in `[0, 1]`.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let position = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
        }
    }
}

/// Central moments of a sample.
struct Moments {
    n: f64,
    mean: f64,
    /// Sum of squared deviations
    m2_sum: f64,
    m3_sum: f64,
    m4_sum: f64,
    /// Every observation is the same value
    constant: bool,
}

impl Moments {
    /// `sorted` must be non-empty and in ascending order.
    fn from_sorted(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let (mut m2_sum, mut m3_sum, mut m4_sum) = (0.0, 0.0, 0.0);
        for v in values {
            let d = v - mean;
            let d2 = d * d;
            m2_sum += d2;
            m3_sum += d2 * d;
            m4_sum += d2 * d2;
        }
        Self {
            n,
            mean,
            m2_sum,
            m3_sum,
            m4_sum,
            constant: values.first() == values.last(),
        }
    }

    /// Population variance; exactly zero for a constant column, whose
    /// deviations from a rounded mean would otherwise be noise.
    fn population_variance(&self) -> f64 {
        if self.constant {
            0.0
        } else {
            self.m2_sum / self.n
        }
    }

    fn sample_std(&self) -> Option<f64> {
        (self.n >= 2.0).then(|| (self.population_variance() * self.n / (self.n - 1.0)).sqrt())
    }

    fn skewness(&self) -> Option<f64> {
        if self.n < 3.0 {
            return None;
        }
        let m2 = self.population_variance();
        if m2 == 0.0 {
            return Some(0.0);
        }
        let g1 = (self.m3_sum / self.n) / m2.powf(1.5);
        let n = self.n;
        Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
    }

    fn kurtosis(&self) -> Option<f64> {
        if self.n < 4.0 {
            return None;
        }
        let m2 = self.population_variance();
        if m2 == 0.0 {
            return Some(0.0);
        }
        let g2 = (self.m4_sum / self.n) / (m2 * m2) - 3.0;
        let n = self.n;
        Some(((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
    }
}

pub fn numeric_stats(column: &Column) -> NumericStats {
    let mut values: Vec<f64> = column.values().iter().filter_map(|c| c.as_f64()).collect();
    let zeros_count = values.iter().filter(|v| **v == 0.0).count();
    let negative_count = values.iter().filter(|v| **v < 0.0).count();

    if values.is_empty() {
        return NumericStats {
            count: 0,
            mean: None,
            std: None,
            min: None,
            p25: None,
            p50: None,
            p75: None,
            max: None,
            skewness: None,
            kurtosis: None,
            zeros_count,
            negative_count,
        };
    }

    values.sort_by(f64::total_cmp);
    let moments = Moments::from_sorted(&values);

    NumericStats {
        count: values.len(),
        mean: Some(moments.mean),
        std: moments.sample_std(),
        min: values.first().copied(),
        p25: percentile(&values, 0.25),
        p50: percentile(&values, 0.5),
        p75: percentile(&values, 0.75),
        max: values.last().copied(),
        skewness: moments.skewness(),
        kurtosis: moments.kurtosis(),
        zeros_count,
        negative_count,
    }
}

pub fn categorical_stats(column: &Column, row_count: usize) -> CategoricalStats {
    // value -> (count, first row it appeared in)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (row, cell) in column.values().iter().enumerate() {
        if cell.is_missing() {
            continue;
        }
        counts
            .entry(cell.to_string())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, row));
    }

    let unique_values = counts.len();
    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first_seen))| (value, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let top_values = ranked
        .into_iter()
        .take(TOP_VALUES_LIMIT)
        .map(|(value, count, _)| ValueCount { value, count })
        .collect();

    CategoricalStats {
        unique_values,
        top_values,
        cardinality: Cardinality::classify(unique_values, row_count),
    }
}

pub fn datetime_stats(column: &Column) -> DatetimeStats {
    let mut min: Option<NaiveDateTime> = None;
    let mut max: Option<NaiveDateTime> = None;
    for ts in column.values().iter().filter_map(|c| c.as_timestamp()) {
        min = Some(min.map_or(ts, |m| m.min(ts)));
        max = Some(max.map_or(ts, |m| m.max(ts)));
    }

    match (min, max) {
        (Some(min), Some(max)) => DatetimeStats {
            min_date: Some(min.format(ISO_DATETIME_FORMAT).to_string()),
            max_date: Some(max.format(ISO_DATETIME_FORMAT).to_string()),
            range_days: Some((max - min).num_days()),
        },
        _ => DatetimeStats {
            min_date: None,
            max_date: None,
            range_days: None,
        },
    }
}
