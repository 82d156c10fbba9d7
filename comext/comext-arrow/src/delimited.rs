//! Delimited-text (CSV) responses → [`Table`].

use std::{collections::HashSet, io::Cursor, sync::Arc};

use arrow::{
    array::{Array, AsArray},
    csv::{ReaderBuilder, reader::Format},
    datatypes::{DataType, Field, Float64Type, Int64Type, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use comext_core::{OBS_VALUE, Row, Table};
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::ArrowConvertError;

/// Canonical form of a delimited-text header: trimmed and upper-cased.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Parse a CSV body with a header row into a [`Table`].
///
/// Cells are kept as strings except `OBS_VALUE`, whose integer or float
/// cells become JSON numbers. Empty cells become `null`.
///
/// # Errors
///
/// - [`ArrowConvertError::NoColumns`] if the body has no header row.
/// - [`ArrowConvertError::DuplicateColumn`] if two headers normalize to the
///   same name.
/// - [`ArrowConvertError::Arrow`] if the CSV reader rejects the body.
pub fn delimited_text_to_table(text: &str) -> Result<Table, ArrowConvertError> {
    if text.trim().is_empty() {
        return Err(ArrowConvertError::NoColumns);
    }

    let format = Format::default().with_header(true);
    let (inferred, records) = format.infer_schema(Cursor::new(text.as_bytes()), None)?;
    if inferred.fields().is_empty() {
        return Err(ArrowConvertError::NoColumns);
    }

    let mut seen = HashSet::with_capacity(inferred.fields().len());
    let columns: Vec<String> = inferred
        .fields()
        .iter()
        .map(|field| normalize_column_name(field.name()))
        .collect();
    for column in &columns {
        if !seen.insert(column.as_str()) {
            return Err(ArrowConvertError::DuplicateColumn(column.clone()));
        }
    }

    let schema = Schema::new(
        inferred
            .fields()
            .iter()
            .zip(&columns)
            .map(|(field, name)| Field::new(name, cell_type(name, field.data_type()), true))
            .collect::<Vec<_>>(),
    );
    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .build(Cursor::new(text.as_bytes()))?;

    let mut rows = Vec::with_capacity(records);
    for batch in reader {
        append_batch_rows(&batch?, &columns, &mut rows)?;
    }

    debug!(rows = rows.len(), columns = columns.len(), "parsed delimited text");
    Ok(Table::new(columns, rows))
}

/// Only `OBS_VALUE` may be numeric; every other column holds codes such as
/// `0101` or `2020` and is read verbatim.
fn cell_type(column: &str, inferred: &DataType) -> DataType {
    match inferred {
        DataType::Int64 | DataType::Float64 if column == OBS_VALUE => inferred.clone(),
        _ => DataType::Utf8,
    }
}

fn append_batch_rows(
    batch: &RecordBatch,
    columns: &[String],
    rows: &mut Vec<Row>,
) -> Result<(), ArrowError> {
    let cells = batch
        .columns()
        .iter()
        .map(|array| array_to_values(array.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    for row in 0..batch.num_rows() {
        rows.push(
            columns
                .iter()
                .zip(&cells)
                .map(|(name, column)| (name.clone(), column[row].clone()))
                .collect(),
        );
    }
    Ok(())
}

fn array_to_values(array: &dyn Array) -> Result<Vec<Value>, ArrowError> {
    let len = array.len();
    let values = match array.data_type() {
        DataType::Int64 => {
            let a = array.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| non_null(a, i, || Value::from(a.value(i))))
                .collect()
        }
        DataType::Float64 => {
            let a = array.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| {
                    non_null(a, i, || {
                        let v = a.value(i);
                        Number::from_f64(v)
                            .map(Value::Number)
                            .unwrap_or_else(|| Value::String(v.to_string()))
                    })
                })
                .collect()
        }
        DataType::Utf8 => {
            let a = array.as_string::<i32>();
            (0..len)
                .map(|i| non_null(a, i, || Value::String(a.value(i).to_string())))
                .collect()
        }
        other => {
            return Err(ArrowError::SchemaError(format!(
                "unexpected delimited column type {other}"
            )));
        }
    };
    Ok(values)
}

fn non_null<A: Array + ?Sized>(array: &A, i: usize, value: impl FnOnce() -> Value) -> Value {
    if array.is_null(i) { Value::Null } else { value() }
}
