//! CSV reader.

use std::path::Path;

use datafusion::prelude::{CsvReadOptions, SessionContext};
use tracing::debug;

use super::{collect_table, path_and_extension, IngestConfig};
use crate::error::Result;
use crate::table::Table;

pub(super) async fn read(path: &Path, config: &IngestConfig) -> Result<Table> {
    let (path, extension) = path_and_extension(path, "CSV")?;
    debug!(path = %path, delimiter = %(config.csv_delimiter as char), "Reading CSV");

    let options = CsvReadOptions::new()
        .has_header(config.csv_has_header)
        .delimiter(config.csv_delimiter)
        .schema_infer_max_records(config.schema_infer_max_records)
        .file_extension(&extension);

    let ctx = SessionContext::new();
    let df = ctx.read_csv(path.as_str(), options).await?;
    collect_table(df).await
}
