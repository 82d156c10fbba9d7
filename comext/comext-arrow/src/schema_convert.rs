use arrow::datatypes::{DataType, Field, Schema};
use comext_core::Table;
use serde_json::Value;

/// Arrow column type chosen for a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Boolean,
    Int64,
    Float64,
    Utf8,
}

impl ColumnKind {
    /// Kind of a single cell; `None` for JSON null.
    pub fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => return None,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() => Self::Int64,
            Value::Number(_) => Self::Float64,
            Value::String(_) | Value::Array(_) | Value::Object(_) => Self::Utf8,
        })
    }

    /// Smallest kind able to hold both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int64, Self::Float64) | (Self::Float64, Self::Int64) => Self::Float64,
            _ => Self::Utf8,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Boolean => DataType::Boolean,
            Self::Int64 => DataType::Int64,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
        }
    }
}

/// Infer the kind of `column` from its non-null cells.
///
/// Columns without any non-null cell are `Utf8`.
pub fn infer_column_kind(table: &Table, column: &str) -> ColumnKind {
    table
        .column_values(column)
        .flatten()
        .filter_map(ColumnKind::of)
        .reduce(ColumnKind::merge)
        .unwrap_or(ColumnKind::Utf8)
}

/// Arrow schema of `table`: one nullable field per column, in table order.
pub fn table_schema(table: &Table) -> Schema {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|column| Field::new(column, infer_column_kind(table, column).data_type(), true))
        .collect();
    Schema::new(fields)
}
