//! In-memory columnar table model.
//!
//! A [`Table`] is an ordered list of named [`Column`]s of equal length. Every
//! column declares a [`StorageKind`] and holds one [`CellValue`] per row; a cell
//! is either [`CellValue::Missing`] or a value of the column's kind. Tables are
//! validated once in [`Table::try_new`] and never mutated afterwards, so the
//! analysis components can pattern-match cells without re-checking types.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::error::{EngineError, Result};

pub mod convert;
pub mod metadata;

pub use metadata::{ContainerFormat, SourceMetadata};

/// Format used for timestamps everywhere they are rendered as text.
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Declared storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// 64-bit signed integers
    Integer,
    /// 64-bit floating point numbers
    Float,
    /// UTF-8 text
    Text,
    /// true/false
    Boolean,
    /// Naive (timezone-free) date and time
    Timestamp,
    /// No typed values at all (e.g. an all-null source column)
    Missing,
}

impl StorageKind {
    /// Returns the lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Integer => "integer",
            StorageKind::Float => "float",
            StorageKind::Text => "text",
            StorageKind::Boolean => "boolean",
            StorageKind::Timestamp => "timestamp",
            StorageKind::Missing => "missing",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl CellValue {
    /// True for explicit missing markers and for NaN floats.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell, if it holds a (non-NaN) number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Timestamp view of the cell.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// The storage kind this cell belongs to (`Missing` for missing cells).
    pub fn kind(&self) -> StorageKind {
        match self {
            CellValue::Missing => StorageKind::Missing,
            CellValue::Integer(_) => StorageKind::Integer,
            CellValue::Float(_) => StorageKind::Float,
            CellValue::Text(_) => StorageKind::Text,
            CellValue::Boolean(_) => StorageKind::Boolean,
            CellValue::Timestamp(_) => StorageKind::Timestamp,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Integer(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Timestamp(ts) => write!(f, "{}", ts.format(ISO_DATETIME_FORMAT)),
        }
    }
}

/// Missing cells serialize as `null` so that previews keep every position.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Missing => serializer.serialize_none(),
            CellValue::Integer(v) => serializer.serialize_i64(*v),
            CellValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            CellValue::Float(_) => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
            CellValue::Timestamp(ts) => {
                serializer.serialize_str(&ts.format(ISO_DATETIME_FORMAT).to_string())
            }
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::Timestamp(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Missing, Into::into)
    }
}

/// A named column of cells with a declared storage kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: StorageKind,
    values: Vec<CellValue>,
}

impl Column {
    /// Creates a column. Cell/kind agreement is checked by [`Table::try_new`].
    pub fn new(name: impl Into<String>, kind: StorageKind, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Integer column from optional values.
    pub fn integers<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        Self::new(name, StorageKind::Integer, collect_cells(values))
    }

    /// Float column from optional values.
    pub fn floats<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::new(name, StorageKind::Float, collect_cells(values))
    }

    /// Text column from optional values.
    pub fn texts<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let cells = values
            .into_iter()
            .map(|v| v.map_or(CellValue::Missing, |s| CellValue::Text(s.into())))
            .collect();
        Self::new(name, StorageKind::Text, cells)
    }

    /// Boolean column from optional values.
    pub fn booleans<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        Self::new(name, StorageKind::Boolean, collect_cells(values))
    }

    /// Timestamp column from optional values.
    pub fn timestamps<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<NaiveDateTime>>,
    {
        Self::new(name, StorageKind::Timestamp, collect_cells(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells (including NaN floats).
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Checks cell/kind agreement, widening integers stored in a float column.
    fn normalize(&mut self) -> Result<()> {
        for (row, cell) in self.values.iter_mut().enumerate() {
            if let (StorageKind::Float, CellValue::Integer(v)) = (self.kind, &*cell) {
                let widened = *v as f64;
                *cell = CellValue::Float(widened);
                continue;
            }
            let cell_kind = cell.kind();
            if cell_kind != StorageKind::Missing && cell_kind != self.kind {
                return Err(EngineError::invalid_table(format!(
                    "column '{}' is declared {} but row {row} holds a {cell_kind} value",
                    self.name, self.kind
                )));
            }
        }
        Ok(())
    }
}

fn collect_cells<I, T>(values: I) -> Vec<CellValue>
where
    I: IntoIterator<Item = Option<T>>,
    T: Into<CellValue>,
{
    values.into_iter().map(CellValue::from).collect()
}

/// Immutable, validated columnar snapshot of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Validates and builds a table.
    ///
    /// Fails with [`EngineError::InvalidTable`] when column lengths differ, a
    /// name is empty or repeated, or a cell does not match its column's kind.
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::with_capacity(columns.len());
        let mut columns = columns;

        for column in &mut columns {
            if column.name.is_empty() {
                return Err(EngineError::invalid_table("column names must not be empty"));
            }
            if !seen.insert(column.name.clone()) {
                return Err(EngineError::invalid_table(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
            if column.len() != row_count {
                return Err(EngineError::invalid_table(format!(
                    "column '{}' has {} rows, expected {row_count}",
                    column.name,
                    column.len()
                )));
            }
            column.normalize()?;
        }

        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn total_cells(&self) -> usize {
        self.row_count * self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.row_count == 0
    }

    /// Returns the cells of one row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }
}
