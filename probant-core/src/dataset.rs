//! Tabular model inputs with declared column semantics.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Semantic kind of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Category,
    Numeric,
}

/// A named table of string cells, the unit of data handed to models.
///
/// Row order is part of the contract: model predictions are realigned to
/// rows by position, so a dataset never reorders what it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    kinds: HashMap<String, ColumnKind>,
}

impl Dataset {
    /// Build a dataset, validating that every row matches the column list
    /// and every column has a declared kind.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        kinds: HashMap<String, ColumnKind>,
    ) -> Result<Self, ScanError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ScanError::dataset(format!(
                    "row {i} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        for column in &columns {
            if !kinds.contains_key(column) {
                return Err(ScanError::dataset(format!(
                    "column '{column}' has no declared kind"
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows,
            kinds,
        })
    }

    /// Single-column convenience constructor.
    pub fn from_column(
        name: impl Into<String>,
        column: &str,
        kind: ColumnKind,
        values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: vec![column.to_string()],
            rows: values.into_iter().map(|v| vec![v]).collect(),
            kinds: HashMap::from([(column.to_string(), kind)]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Declared kind of a column, if the column exists.
    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.kinds.get(column).copied()
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, ScanError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// One row as a column-name → cell map.
    pub fn row_values(&self, index: usize) -> Option<HashMap<&str, &str>> {
        self.rows.get(index).map(|row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect()
        })
    }

    /// Projection onto a subset of columns, preserving row order.
    pub fn select(&self, keep: &[&str]) -> Result<Dataset, ScanError> {
        let indices = keep
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let columns: Vec<String> = keep.iter().map(|c| c.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        let kinds = columns
            .iter()
            .map(|c| (c.clone(), self.kinds[c]))
            .collect();
        Ok(Dataset {
            name: self.name.clone(),
            columns,
            rows,
            kinds,
        })
    }

    fn column_index(&self, name: &str) -> Result<usize, ScanError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ScanError::dataset(format!("unknown column '{name}'")))
    }
}
