//! Semantic type classification of columns.
//!
//! Classification is driven purely by the declared [`StorageKind`]; no cell is
//! inspected. The mapping is total, so every column of a validated table lands
//! in exactly one of the four [`ColumnClass`] buckets.

use std::fmt;

use serde::Serialize;

use crate::table::{StorageKind, Table};

/// Semantic class used to route statistics computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnClass {
    Numeric,
    Categorical,
    Datetime,
    Boolean,
}

impl ColumnClass {
    /// Priority order: boolean, datetime, numeric, then categorical for
    /// everything else (text and all-missing columns).
    pub fn for_kind(kind: StorageKind) -> Self {
        match kind {
            StorageKind::Boolean => ColumnClass::Boolean,
            StorageKind::Timestamp => ColumnClass::Datetime,
            StorageKind::Integer | StorageKind::Float => ColumnClass::Numeric,
            StorageKind::Text | StorageKind::Missing => ColumnClass::Categorical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnClass::Numeric => "numeric",
            ColumnClass::Categorical => "categorical",
            ColumnClass::Datetime => "datetime",
            ColumnClass::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column name to class, kept in the table's column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    entries: Vec<(String, ColumnClass)>,
}

impl Classification {
    pub fn class_of(&self, column: &str) -> Option<ColumnClass> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, class)| *class)
    }

    /// Columns of one class in table order.
    pub fn columns_of(&self, class: ColumnClass) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, c)| *c == class)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnClass)> {
        self.entries.iter().map(|(name, class)| (name.as_str(), *class))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `column_types` report section.
    pub fn column_types(&self) -> ColumnTypes {
        let owned = |class: ColumnClass| -> Vec<String> {
            self.columns_of(class)
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        ColumnTypes {
            numeric: owned(ColumnClass::Numeric),
            categorical: owned(ColumnClass::Categorical),
            datetime: owned(ColumnClass::Datetime),
            boolean: owned(ColumnClass::Boolean),
        }
    }
}

/// The four classification buckets; together they partition the column set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnTypes {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub datetime: Vec<String>,
    pub boolean: Vec<String>,
}

/// Classifies every column of `table`.
pub fn classify(table: &Table) -> Classification {
    Classification {
        entries: table
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), ColumnClass::for_kind(c.kind())))
            .collect(),
    }
}
