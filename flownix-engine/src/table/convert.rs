//! Conversion from Arrow record batches to [`Table`].
//!
//! This is the boundary where source types are mapped onto [`StorageKind`]s.
//! Arrow types without a mapping (lists, structs, binary, intervals, ...) are
//! rejected here with [`EngineError::UnsupportedStorageKind`] so they never
//! reach the classifier.

use std::iter;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Float64Type, Int64Type, Schema, TimeUnit, TimestampMicrosecondType, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use super::{CellValue, Column, StorageKind, Table};
use crate::error::{EngineError, Result};

/// Maps an Arrow data type onto a storage kind, if it has one.
pub fn storage_kind_for(data_type: &DataType) -> Option<StorageKind> {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Some(StorageKind::Integer),
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => Some(StorageKind::Float),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(StorageKind::Text),
        DataType::Boolean => Some(StorageKind::Boolean),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            Some(StorageKind::Timestamp)
        }
        DataType::Null => Some(StorageKind::Missing),
        DataType::Dictionary(_, value_type) => storage_kind_for(value_type),
        _ => None,
    }
}

/// Builds a table from batches sharing `schema`.
///
/// An empty batch list yields a table with the schema's columns and zero rows.
pub fn table_from_batches(schema: &Schema, batches: &[RecordBatch]) -> Result<Table> {
    let row_count: usize = batches.iter().map(RecordBatch::num_rows).sum();
    let mut columns = Vec::with_capacity(schema.fields().len());

    for (idx, field) in schema.fields().iter().enumerate() {
        let kind = storage_kind_for(field.data_type()).ok_or_else(|| {
            EngineError::unsupported_kind(field.name().as_str(), field.data_type().to_string())
        })?;

        let mut values = Vec::with_capacity(row_count);
        for batch in batches {
            append_cells(batch.column(idx), kind, field.name(), &mut values)?;
        }
        columns.push(Column::new(field.name().as_str(), kind, values));
    }

    debug!(
        columns = columns.len(),
        rows = row_count,
        batches = batches.len(),
        "Converted record batches to table"
    );

    Table::try_new(columns)
}

fn append_cells(
    array: &ArrayRef,
    kind: StorageKind,
    column: &str,
    out: &mut Vec<CellValue>,
) -> Result<()> {
    match kind {
        StorageKind::Integer if array.data_type() == &DataType::UInt64 => {
            let values = array.as_primitive::<UInt64Type>();
            for value in values.iter() {
                let cell = match value {
                    None => CellValue::Missing,
                    Some(v) => CellValue::Integer(i64::try_from(v).map_err(|_| {
                        EngineError::invalid_table(format!(
                            "column '{column}' holds {v}, which does not fit a 64-bit signed integer"
                        ))
                    })?),
                };
                out.push(cell);
            }
        }
        StorageKind::Integer => {
            let casted = cast(array, &DataType::Int64)?;
            out.extend(casted.as_primitive::<Int64Type>().iter().map(CellValue::from));
        }
        StorageKind::Float => {
            let casted = cast(array, &DataType::Float64)?;
            out.extend(
                casted
                    .as_primitive::<Float64Type>()
                    .iter()
                    .map(|v| match v {
                        Some(f) if !f.is_nan() => CellValue::Float(f),
                        _ => CellValue::Missing,
                    }),
            );
        }
        StorageKind::Text => {
            let casted = cast(array, &DataType::Utf8)?;
            out.extend(
                casted
                    .as_string::<i32>()
                    .iter()
                    .map(|v| v.map_or(CellValue::Missing, CellValue::from)),
            );
        }
        StorageKind::Boolean => {
            let casted = cast(array, &DataType::Boolean)?;
            out.extend(casted.as_boolean().iter().map(CellValue::from));
        }
        StorageKind::Timestamp => {
            let casted = cast(array, &DataType::Timestamp(TimeUnit::Microsecond, None))?;
            let values = casted.as_primitive::<TimestampMicrosecondType>();
            out.extend((0..values.len()).map(|i| {
                if values.is_null(i) {
                    CellValue::Missing
                } else {
                    values
                        .value_as_datetime(i)
                        .map_or(CellValue::Missing, CellValue::Timestamp)
                }
            }));
        }
        StorageKind::Missing => {
            out.extend(iter::repeat_n(CellValue::Missing, array.len()));
        }
    }
    Ok(())
}
