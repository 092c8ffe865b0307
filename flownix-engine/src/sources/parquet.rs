//! Parquet reader.

use std::path::Path;

use datafusion::prelude::{ParquetReadOptions, SessionContext};
use tracing::debug;

use super::{collect_table, path_and_extension};
use crate::error::Result;
use crate::table::Table;

pub(super) async fn read(path: &Path) -> Result<Table> {
    let (path, extension) = path_and_extension(path, "Parquet")?;
    debug!(path = %path, "Reading Parquet");

    let options = ParquetReadOptions {
        file_extension: &extension,
        ..Default::default()
    };

    let ctx = SessionContext::new();
    let df = ctx.read_parquet(path.as_str(), options).await?;
    collect_table(df).await
}
