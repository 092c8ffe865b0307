//! Missingness, duplication and memory-footprint profiling.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{percentage, round_to};
use crate::table::{CellValue, Column, StorageKind, Table};

/// Estimated bytes per cell for fixed-width kinds.
const FIXED_CELL_BYTES: u64 = 8;
/// Estimated bytes per boolean cell.
const BOOLEAN_CELL_BYTES: u64 = 1;
/// Per-cell overhead of a text cell (pointer, length, capacity) before its payload.
const TEXT_CELL_OVERHEAD_BYTES: u64 = 24;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Missing-value counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValues {
    pub total_missing: usize,
    pub missing_by_column: BTreeMap<String, usize>,
    /// Percent of rows missing per column, 2 decimal places
    pub missing_percentage: BTreeMap<String, f64>,
    /// Columns with at least one missing cell, in table order
    pub columns_with_missing: Vec<String>,
}

/// Full-row duplicate counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duplicates {
    pub duplicate_rows: usize,
    pub duplicate_percentage: f64,
}

/// Estimated in-memory footprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryUsage {
    pub memory_by_column: BTreeMap<String, u64>,
    pub total_bytes: u64,
    pub total_memory_mb: f64,
    pub avg_row_size_bytes: f64,
}

/// Output of [`profile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityProfile {
    pub missing: MissingValues,
    pub duplicates: Duplicates,
    pub memory: MemoryUsage,
}

/// Runs all three quality profiles over one table.
pub fn profile(table: &Table) -> QualityProfile {
    QualityProfile {
        missing: missing_values(table),
        duplicates: duplicates(table),
        memory: memory_usage(table),
    }
}

pub fn missing_values(table: &Table) -> MissingValues {
    let rows = table.row_count();
    let mut missing_by_column = BTreeMap::new();
    let mut missing_percentage = BTreeMap::new();
    let mut columns_with_missing = Vec::new();
    let mut total_missing = 0;

    for column in table.columns() {
        let count = column.missing_count();
        total_missing += count;
        if count > 0 {
            columns_with_missing.push(column.name().to_string());
        }
        missing_by_column.insert(column.name().to_string(), count);
        missing_percentage.insert(
            column.name().to_string(),
            round_to(percentage(count, rows), 2),
        );
    }

    MissingValues {
        total_missing,
        missing_by_column,
        missing_percentage,
        columns_with_missing,
    }
}

/// Hashable view of a cell used to compare rows by value.
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Missing,
    Integer(i64),
    Float(u64),
    Text(&'a str),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl<'a> From<&'a CellValue> for CellKey<'a> {
    fn from(cell: &'a CellValue) -> Self {
        match cell {
            CellValue::Missing => CellKey::Missing,
            CellValue::Float(v) if v.is_nan() => CellKey::Missing,
            // -0.0 and 0.0 compare equal as values
            CellValue::Float(v) if *v == 0.0 => CellKey::Float(0.0f64.to_bits()),
            CellValue::Float(v) => CellKey::Float(v.to_bits()),
            CellValue::Integer(v) => CellKey::Integer(*v),
            CellValue::Text(s) => CellKey::Text(s),
            CellValue::Boolean(b) => CellKey::Boolean(*b),
            CellValue::Timestamp(ts) => CellKey::Timestamp(*ts),
        }
    }
}

/// Counts rows equal to an earlier row; the first occurrence is not a duplicate.
pub fn duplicates(table: &Table) -> Duplicates {
    let rows = table.row_count();
    let columns = table.columns();
    let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(rows);
    let mut duplicate_rows = 0;

    for row in 0..rows {
        let key: Vec<CellKey<'_>> = columns
            .iter()
            .map(|c| CellKey::from(&c.values()[row]))
            .collect();
        if !seen.insert(key) {
            duplicate_rows += 1;
        }
    }

    Duplicates {
        duplicate_rows,
        duplicate_percentage: round_to(percentage(duplicate_rows, rows), 2),
    }
}

fn column_bytes(column: &Column) -> u64 {
    let rows = column.len() as u64;
    match column.kind() {
        StorageKind::Integer
        | StorageKind::Float
        | StorageKind::Timestamp
        | StorageKind::Missing => FIXED_CELL_BYTES * rows,
        StorageKind::Boolean => BOOLEAN_CELL_BYTES * rows,
        StorageKind::Text => column
            .values()
            .iter()
            .map(|cell| match cell {
                CellValue::Text(s) => TEXT_CELL_OVERHEAD_BYTES + s.len() as u64,
                _ => TEXT_CELL_OVERHEAD_BYTES,
            })
            .sum(),
    }
}

pub fn memory_usage(table: &Table) -> MemoryUsage {
    let mut memory_by_column = BTreeMap::new();
    let mut total_bytes = 0;

    for column in table.columns() {
        let bytes = column_bytes(column);
        total_bytes += bytes;
        memory_by_column.insert(column.name().to_string(), bytes);
    }

    let avg_row_size_bytes = match table.row_count() {
        0 => 0.0,
        rows => round_to(total_bytes as f64 / rows as f64, 2),
    };

    MemoryUsage {
        memory_by_column,
        total_bytes,
        total_memory_mb: round_to(total_bytes as f64 / BYTES_PER_MB, 2),
        avg_row_size_bytes,
    }
}
