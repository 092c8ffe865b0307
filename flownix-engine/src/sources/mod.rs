//! Ingestion of uploaded files into [`Table`]s.
//!
//! CSV, newline-delimited JSON and Parquet are read through DataFusion and
//! converted from Arrow record batches; Excel workbooks are read with
//! `calamine`. Uploads arriving as bytes are spilled to a temporary file in
//! [`IngestConfig::temp_dir`] first so that every format goes through the same
//! path-based readers.

use std::path::{Path, PathBuf};

use datafusion::prelude::DataFrame;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

use crate::error::{EngineError, ErrorContext, Result};
use crate::logging::{truncate_field, MAX_LOGGED_FIELD_LENGTH};
use crate::table::convert::table_from_batches;
use crate::table::{ContainerFormat, SourceMetadata, Table};

mod csv;
mod excel;
mod json;
mod parquet;

/// Default upload limit: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Options controlling ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Largest accepted payload in bytes
    pub max_upload_size: u64,
    /// Directory byte uploads are spilled to while being parsed
    pub temp_dir: PathBuf,
    /// Whether CSV files start with a header row
    pub csv_has_header: bool,
    /// CSV field delimiter
    pub csv_delimiter: u8,
    /// Records sampled for CSV/JSON schema inference
    pub schema_infer_max_records: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            temp_dir: std::env::temp_dir().join("flownix"),
            csv_has_header: true,
            csv_delimiter: b',',
            schema_infer_max_records: 1000,
        }
    }
}

impl IngestConfig {
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn with_csv_delimiter(mut self, delimiter: u8) -> Self {
        self.csv_delimiter = delimiter;
        self
    }

    pub fn with_csv_header(mut self, has_header: bool) -> Self {
        self.csv_has_header = has_header;
        self
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_upload_size {
            return Err(EngineError::UploadTooLarge {
                size,
                limit: self.max_upload_size,
            });
        }
        Ok(())
    }
}

/// A parsed table together with where it came from.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: Table,
    pub metadata: SourceMetadata,
}

/// Parses an uploaded payload. `filename` is the client-supplied name and only
/// its extension is used to pick the reader.
#[instrument(skip_all, fields(
    filename = %truncate_field(filename, MAX_LOGGED_FIELD_LENGTH),
    size = bytes.len()
))]
pub async fn ingest_bytes(
    bytes: &[u8],
    filename: &str,
    config: &IngestConfig,
) -> Result<IngestedTable> {
    let size = bytes.len() as u64;
    config.check_size(size)?;
    let format = ContainerFormat::from_filename(filename)?;

    tokio::fs::create_dir_all(&config.temp_dir)
        .await
        .with_context(|| format!("Failed to create temp dir {}", config.temp_dir.display()))?;

    let spill = tempfile::Builder::new()
        .prefix("flownix-upload-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile_in(&config.temp_dir)?;

    let mut file = tokio::fs::File::create(spill.path()).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    let table = read_table(spill.path(), format, config).await?;
    finish(table, SourceMetadata::new(filename, format, size))
}

/// Parses a file on disk.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn ingest_path(path: impl AsRef<Path>, config: &IngestConfig) -> Result<IngestedTable> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            EngineError::Configuration(format!("'{}' does not name a file", path.display()))
        })?;
    let format = ContainerFormat::from_filename(filename)?;

    let size = tokio::fs::metadata(path).await?.len();
    config.check_size(size)?;

    let table = read_table(path, format, config).await?;
    finish(table, SourceMetadata::new(filename, format, size))
}

async fn read_table(path: &Path, format: ContainerFormat, config: &IngestConfig) -> Result<Table> {
    match format {
        ContainerFormat::Csv => csv::read(path, config).await,
        ContainerFormat::Json => json::read(path, config).await,
        ContainerFormat::Parquet => parquet::read(path).await,
        ContainerFormat::Xlsx | ContainerFormat::Xls => excel::read(path, format).await,
    }
}

fn finish(table: Table, metadata: SourceMetadata) -> Result<IngestedTable> {
    info!(
        format = %metadata.format,
        rows = table.row_count(),
        columns = table.column_count(),
        "Ingested dataset"
    );
    Ok(IngestedTable { table, metadata })
}

/// DataFusion needs a UTF-8 path and the file's own extension.
fn path_and_extension(path: &Path, source_type: &str) -> Result<(String, String)> {
    let path_str = path.to_str().ok_or_else(|| {
        EngineError::data_source(source_type, format!("path is not valid UTF-8: {}", path.display()))
    })?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    Ok((path_str.to_string(), extension))
}

/// Executes a DataFusion plan and converts the result.
async fn collect_table(df: DataFrame) -> Result<Table> {
    let schema = df.schema().inner().clone();
    let batches = df.collect().await?;
    table_from_batches(&schema, &batches)
}
