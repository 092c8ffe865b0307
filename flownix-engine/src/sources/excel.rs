//! Excel reader (`.xlsx`, `.xlsm`, `.xls`).
//!
//! Only the first worksheet is read. Its first row is the header; blank
//! header cells become `column_N` (1-based) and repeated names get a `.N`
//! suffix. Spreadsheet cells carry no column type, so each column's
//! [`StorageKind`] is inferred from its non-empty cells:
//!
//! | cells                                  | kind        |
//! |----------------------------------------|-------------|
//! | none                                   | `Missing`   |
//! | all booleans                           | `Boolean`   |
//! | all numbers, every one a whole number  | `Integer`   |
//! | all numbers                            | `Float`     |
//! | all dates/datetimes                    | `Timestamp` |
//! | anything else                          | `Text`      |
//!
//! Error cells (`#N/A`, `#DIV/0!`, ...) are treated as empty.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, DataType, Reader, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::table::{CellValue, Column, ContainerFormat, StorageKind, Table, ISO_DATETIME_FORMAT};

const SOURCE_TYPE: &str = "Excel";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Largest float that still converts to `i64` without saturating.
const I64_BOUND: f64 = 9_223_372_036_854_775_807.0;

pub(super) async fn read(path: &Path, format: ContainerFormat) -> Result<Table> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_blocking(&path, format))
        .await
        .map_err(|e| EngineError::Internal(format!("Excel reader task failed: {e}")))?
}

/// The reader is picked from `format`, never from the path's extension.
fn read_blocking(path: &Path, format: ContainerFormat) -> Result<Table> {
    let rows = match format {
        ContainerFormat::Xls => first_sheet_rows::<Xls<BufReader<File>>>(path)?,
        _ => first_sheet_rows::<Xlsx<BufReader<File>>>(path)?,
    };
    debug!(path = %path.display(), rows = rows.len(), "Read worksheet");
    table_from_rows(&rows)
}

fn first_sheet_rows<R>(path: &Path) -> Result<Vec<Vec<Data>>>
where
    R: Reader<BufReader<File>>,
    R::Error: fmt::Display,
{
    let mut workbook: R = open_workbook(path).map_err(|e| {
        EngineError::data_source(SOURCE_TYPE, format!("cannot open {}: {e}", path.display()))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::data_source(SOURCE_TYPE, "workbook has no worksheets"))?
        .map_err(|e| EngineError::data_source(SOURCE_TYPE, format!("cannot read first sheet: {e}")))?;

    Ok(range.rows().map(|r| r.to_vec()).collect())
}

/// Builds a table from worksheet rows, the first of which is the header.
pub(crate) fn table_from_rows(rows: &[Vec<Data>]) -> Result<Table> {
    let Some((header, body)) = rows.split_first() else {
        return Table::try_new(Vec::new());
    };

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let names = column_names(header, width);

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<Option<&Data>> = body
                .iter()
                .map(|row| row.get(idx).filter(|c| !is_blank(c)))
                .collect();
            build_column(name, &cells)
        })
        .collect();

    Table::try_new(columns)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn column_names(header: &[Data], width: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    (0..width)
        .map(|idx| {
            let base = match header.get(idx) {
                Some(cell) if !is_blank(cell) => cell.to_string().trim().to_string(),
                _ => format!("column_{}", idx + 1),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

fn as_whole(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(v) => Some(*v),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < I64_BOUND => Some(*f as i64),
        _ => None,
    }
}

fn as_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(v) => Some(*v as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn as_timestamp(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(_) => cell.as_datetime(),
        Data::DateTimeIso(s) => parse_datetime(s),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn infer_kind(cells: &[Option<&Data>]) -> StorageKind {
    let mut present = cells.iter().flatten().peekable();
    if present.peek().is_none() {
        return StorageKind::Missing;
    }
    let present: Vec<&Data> = present.copied().collect();

    if present.iter().all(|c| matches!(c, Data::Bool(_))) {
        StorageKind::Boolean
    } else if present.iter().all(|c| as_whole(c).is_some()) {
        StorageKind::Integer
    } else if present.iter().all(|c| as_number(c).is_some()) {
        StorageKind::Float
    } else if present.iter().all(|c| as_timestamp(c).is_some()) {
        StorageKind::Timestamp
    } else {
        StorageKind::Text
    }
}

fn text_of(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => match as_timestamp(other) {
            Some(ts) => ts.format(ISO_DATETIME_FORMAT).to_string(),
            None => other.to_string(),
        },
    }
}

fn build_column(name: String, cells: &[Option<&Data>]) -> Column {
    let kind = infer_kind(cells);
    let values = cells
        .iter()
        .map(|cell| {
            let Some(cell) = cell else {
                return CellValue::Missing;
            };
            let value = match kind {
                StorageKind::Boolean => cell.get_bool().map(CellValue::Boolean),
                StorageKind::Integer => as_whole(cell).map(CellValue::Integer),
                StorageKind::Float => as_number(cell).map(CellValue::Float),
                StorageKind::Timestamp => as_timestamp(cell).map(CellValue::Timestamp),
                StorageKind::Text => Some(CellValue::Text(text_of(cell))),
                StorageKind::Missing => None,
            };
            value.unwrap_or(CellValue::Missing)
        })
        .collect();
    Column::new(name, kind, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_header_and_kinds() {
        let rows = vec![
            vec![s("id"), s("price"), s("active"), s("label"), s("when")],
            vec![
                Data::Float(1.0),
                Data::Float(9.5),
                Data::Bool(true),
                s("a"),
                Data::DateTimeIso("2024-01-01T08:30:00".into()),
            ],
            vec![
                Data::Int(2),
                Data::Int(10),
                Data::Bool(false),
                Data::Float(3.0),
                Data::DateTimeIso("2024-01-03".into()),
            ],
        ];
        let table = table_from_rows(&rows).unwrap();

        assert_eq!(table.row_count(), 2);
        let kinds: Vec<StorageKind> = table.columns().iter().map(Column::kind).collect();
        assert_eq!(
            kinds,
            vec![
                StorageKind::Integer,
                StorageKind::Float,
                StorageKind::Boolean,
                StorageKind::Text,
                StorageKind::Timestamp,
            ]
        );
        assert_eq!(table.column("id").unwrap().values()[0], CellValue::Integer(1));
        assert_eq!(table.column("price").unwrap().values()[1], CellValue::Float(10.0));
        assert_eq!(
            table.column("label").unwrap().values()[1],
            CellValue::Text("3".into())
        );
    }

    #[test]
    fn test_blank_and_repeated_headers() {
        let rows = vec![
            vec![s("a"), Data::Empty, s("a")],
            vec![Data::Int(1), Data::Int(2), Data::Int(3), Data::Int(4)],
        ];
        let table = table_from_rows(&rows).unwrap();
        assert_eq!(table.column_names(), vec!["a", "column_2", "a.1", "column_4"]);
    }

    #[test]
    fn test_short_rows_and_error_cells_are_missing() {
        let rows = vec![
            vec![s("x"), s("y")],
            vec![Data::Int(1)],
            vec![Data::Int(2), Data::Error(calamine::CellErrorType::Div0)],
            vec![Data::Int(3), Data::Float(0.5)],
        ];
        let table = table_from_rows(&rows).unwrap();
        let y = table.column("y").unwrap();
        assert_eq!(y.kind(), StorageKind::Float);
        assert_eq!(y.missing_count(), 2);
    }

    #[test]
    fn test_all_empty_column_is_missing_kind() {
        let rows = vec![vec![s("blank")], vec![Data::Empty], vec![s("  ")]];
        let table = table_from_rows(&rows).unwrap();
        assert_eq!(table.column("blank").unwrap().kind(), StorageKind::Missing);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_empty_sheet_has_no_columns() {
        let table = table_from_rows(&[]).unwrap();
        assert_eq!(table.column_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_workbook() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = read(&path, ContainerFormat::Xlsx).await.unwrap_err();
        assert!(matches!(err, EngineError::DataSource { .. }));
    }

    #[tokio::test]
    async fn test_uppercase_extension_uses_detected_format() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("BOOK.XLSX");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = read(&path, ContainerFormat::Xlsx).await.unwrap_err();
        // Reaches the xlsx parser instead of failing format detection
        let message = err.to_string();
        assert!(!message.contains("detect"), "{message}");
        assert!(matches!(err, EngineError::DataSource { .. }));
    }
}
