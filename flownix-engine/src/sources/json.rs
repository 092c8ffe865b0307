//! Newline-delimited JSON reader.

use std::path::Path;

use datafusion::prelude::{NdJsonReadOptions, SessionContext};
use tracing::debug;

use super::{collect_table, path_and_extension, IngestConfig};
use crate::error::Result;
use crate::table::Table;

/// Reads one JSON object per line. A top-level JSON array is not accepted.
pub(super) async fn read(path: &Path, config: &IngestConfig) -> Result<Table> {
    let (path, extension) = path_and_extension(path, "JSON")?;
    debug!(path = %path, "Reading NDJSON");

    let mut options = NdJsonReadOptions::default();
    options.schema_infer_max_records = config.schema_infer_max_records;
    options.file_extension = &extension;

    let ctx = SessionContext::new();
    let df = ctx.read_json(path.as_str(), options).await?;
    collect_table(df).await
}
