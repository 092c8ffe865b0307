//! The analysis report returned to callers.
//!
//! Every keyed section is a `BTreeMap` and every list follows the table's
//! column order, so identical input serializes to identical JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::{
    ColumnTypes, DataQuality, Duplicates, HighCorrelation, MemoryUsage, MissingValues, Statistics,
};
use crate::error::Result;
use crate::registry::DatasetId;
use crate::table::{CellValue, ContainerFormat, SourceMetadata, StorageKind, Table};

/// Rows shown at each end of the preview.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicInfo {
    pub filename: String,
    pub format: ContainerFormat,
    pub file_size: u64,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// Declared storage kind per column
    pub dtypes: BTreeMap<String, StorageKind>,
}

impl BasicInfo {
    pub fn new(table: &Table, metadata: &SourceMetadata) -> Self {
        Self {
            filename: metadata.filename.clone(),
            format: metadata.format,
            file_size: metadata.file_size,
            rows: table.row_count(),
            columns: table.column_count(),
            column_names: table.column_names().into_iter().map(str::to_string).collect(),
            dtypes: table
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.kind()))
                .collect(),
        }
    }
}

/// First and last rows of the table. Missing cells serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub head: Vec<Vec<CellValue>>,
    pub tail: Vec<Vec<CellValue>>,
}

impl Preview {
    /// Head and tail overlap when the table has fewer than `2 * PREVIEW_ROWS` rows.
    pub fn new(table: &Table) -> Self {
        let rows = table.row_count();
        let head_end = rows.min(PREVIEW_ROWS);
        let tail_start = rows.saturating_sub(PREVIEW_ROWS);
        let collect = |range: std::ops::Range<usize>| -> Vec<Vec<CellValue>> {
            range
                .filter_map(|idx| table.row(idx))
                .map(|row| row.into_iter().cloned().collect())
                .collect()
        };

        Self {
            columns: table.column_names().into_iter().map(str::to_string).collect(),
            head: collect(0..head_end),
            tail: collect(tail_start..rows),
        }
    }
}

/// Full profile of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub dataset_id: DatasetId,
    pub basic_info: BasicInfo,
    pub column_types: ColumnTypes,
    pub missing_values: MissingValues,
    pub duplicates: Duplicates,
    pub memory_usage: MemoryUsage,
    pub statistics: Statistics,
    /// Strongly correlated numeric pairs, strongest first
    pub correlations: Vec<HighCorrelation>,
    pub data_quality: DataQuality,
    pub preview: Preview,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
