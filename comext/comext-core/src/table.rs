//! Row-oriented table returned by decoding.

use serde_json::Value;

use crate::row::Row;

/// Ordered rows plus the canonical column set shared by them.
///
/// A row may omit columns; [`Table::columns`] still lists the union.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table with an explicit column order.
    ///
    /// Columns present in rows but missing from `columns` are appended in
    /// first-seen order.
    pub fn new(mut columns: Vec<String>, rows: Vec<Row>) -> Self {
        for row in &rows {
            for (name, _) in row.cells() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        Self { columns, rows }
    }

    /// Create a table whose columns are the union of the row columns in
    /// first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(Vec::new(), rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, `None` where a row lacks it.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a Value>> {
        self.rows.iter().map(move |row| row.get(column))
    }
}
