//! In-memory table (`QvdTable`): rows and named columns of [`QvdValue`]s.
//!
//! A table enforces two invariants: every row has exactly as many cells as
//! there are columns, and column names are unique. Construction is the only
//! place these are checked; every other operation preserves them.

use std::collections::HashMap;

use comfy_table::{ContentArrangement, Table as ComfyTable};

use crate::value::QvdValue;
use crate::QvdError;

/// A rectangular table of optional (nullable) typed cells with named
/// columns.
#[derive(Debug, Clone, Default)]
pub struct QvdTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<QvdValue>>>,
}

impl QvdTable {
    /// Build a table from its columns and rows. Fails if any row's length
    /// doesn't match `columns.len()`, or if a column name repeats.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<QvdValue>>>) -> Result<Self, QvdError> {
        let mut seen = std::collections::HashSet::new();
        for name in &columns {
            if !seen.insert(name.clone()) {
                return Err(QvdError::Schema(format!("duplicate column name: {name}")));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(QvdError::Schema(format!(
                    "row {i} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<QvdValue>>] {
        &self.rows
    }

    /// `(row count, column count)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Total cell count (`rows * columns`).
    pub fn size(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize, QvdError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| QvdError::Schema(format!("no such column: {name}")))
    }

    pub fn get_row(&self, row: usize) -> Result<&[Option<QvdValue>], QvdError> {
        self.rows
            .get(row)
            .map(Vec::as_slice)
            .ok_or_else(|| QvdError::Schema(format!("row index {row} out of range (0..{})", self.rows.len())))
    }

    pub fn get_cell(&self, row: usize, column: &str) -> Result<&Option<QvdValue>, QvdError> {
        let col = self.column_index(column)?;
        Ok(&self.get_row(row)?[col])
    }

    /// All values of one column, in row order.
    pub fn get_column(&self, name: &str) -> Result<Vec<&Option<QvdValue>>, QvdError> {
        let col = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[col]).collect())
    }

    /// A new table holding rows `start..end`.
    pub fn slice_rows(&self, start: usize, end: usize) -> Result<Self, QvdError> {
        if start > end || end > self.rows.len() {
            return Err(QvdError::Schema(format!(
                "row range {start}..{end} out of bounds (0..{})",
                self.rows.len()
            )));
        }
        Ok(Self {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        })
    }

    /// A new table with only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self, QvdError> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Self {
            columns: names.iter().map(|s| s.to_string()).collect(),
            rows,
        })
    }

    /// A new table with the named columns removed.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self, QvdError> {
        let keep: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !names.contains(c))
            .collect();
        self.select(&keep)
    }

    /// A new table without the given row indices.
    pub fn drop_rows(&self, indices: &[usize]) -> Result<Self, QvdError> {
        for &i in indices {
            if i >= self.rows.len() {
                return Err(QvdError::Schema(format!(
                    "row index {i} out of range (0..{})",
                    self.rows.len()
                )));
            }
        }
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, row)| row.clone())
            .collect();
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Append another table's rows in place. Both tables must share the
    /// same columns in the same order.
    pub fn append(&mut self, other: &Self) -> Result<(), QvdError> {
        if self.columns != other.columns {
            return Err(QvdError::Schema("cannot append table with different columns".to_string()));
        }
        self.rows.extend(other.rows.iter().cloned());
        Ok(())
    }

    /// Insert one row at `index`.
    pub fn insert_row(&mut self, index: usize, row: Vec<Option<QvdValue>>) -> Result<(), QvdError> {
        if row.len() != self.columns.len() {
            return Err(QvdError::Schema(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        if index > self.rows.len() {
            return Err(QvdError::Schema(format!(
                "insert index {index} out of range (0..={})",
                self.rows.len()
            )));
        }
        self.rows.insert(index, row);
        Ok(())
    }

    /// Every row as a column-name-keyed map, in row order.
    pub fn to_dict(&self) -> Vec<HashMap<String, Option<QvdValue>>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

impl std::fmt::Display for QvdTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = ComfyTable::new();
        table
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(self.columns.iter().cloned());
        for row in &self.rows {
            table.add_row(row.iter().map(|cell| match cell {
                Some(v) => v.display_value(),
                None => String::new(),
            }));
        }
        write!(f, "{table}")
    }
}
