//! Conversion from a decoded [`Table`] to an Arrow `RecordBatch`.
//!
//! Every table column becomes one nullable Arrow column whose type is
//! inferred from its cells. Rows lacking a column get a null cell.

mod append;
mod builder;

use std::sync::Arc;

use arrow::{
    array::ArrayRef,
    datatypes::{Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use comext_core::Table;

use crate::{
    error::ArrowConvertError,
    schema_convert::{ColumnKind, infer_column_kind},
};

/// Convert a table to a RecordBatch with one column per table column.
///
/// Empty tables yield an empty batch with the table's columns.
pub fn table_to_record_batch(table: &Table) -> Result<RecordBatch, ArrowConvertError> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for column in table.columns() {
        let kind = infer_column_kind(table, column);
        fields.push(Field::new(column, kind.data_type(), true));
        arrays.push(build_array(table, column, kind));
    }

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}

fn build_array(table: &Table, column: &str, kind: ColumnKind) -> ArrayRef {
    let mut builder = builder::make_builder(kind, table.num_rows());
    for cell in table.column_values(column) {
        append::append_cell(&mut builder, kind, cell);
    }
    builder.finish()
}
