//! Source metadata attached to a registered table.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{EngineError, Result};

/// Container format of an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// Comma separated values
    Csv,
    /// Newline-delimited JSON records
    Json,
    /// Apache Parquet
    Parquet,
    /// Office Open XML spreadsheet
    Xlsx,
    /// Legacy binary Excel spreadsheet
    Xls,
}

impl ContainerFormat {
    /// Detects the format from a file name's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "json" | "jsonl" | "ndjson" => Ok(Self::Json),
            "parquet" | "pq" => Ok(Self::Parquet),
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(EngineError::UnsupportedFormat(format!(
                "'{filename}': only CSV, JSON, Parquet and Excel files are supported"
            ))),
        }
    }

    /// Canonical file extension, used when spilling uploads to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where a table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    pub filename: String,
    pub format: ContainerFormat,
    /// Size of the uploaded file in bytes
    pub file_size: u64,
}

impl SourceMetadata {
    pub fn new(filename: impl Into<String>, format: ContainerFormat, file_size: u64) -> Self {
        Self {
            filename: filename.into(),
            format,
            file_size,
        }
    }
}
