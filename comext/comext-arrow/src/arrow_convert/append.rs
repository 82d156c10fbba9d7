use arrow::array::{ArrayBuilder, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use serde_json::Value;

use crate::schema_convert::ColumnKind;

macro_rules! cast_builder {
    ($b:expr, $T:ty) => {
        $b.as_any_mut()
            .downcast_mut::<$T>()
            .expect(concat!("expected builder type: ", stringify!($T)))
    };
}

/// Append one cell. Missing cells and JSON null become Arrow nulls; a cell
/// that does not fit the column kind is appended as null.
pub(super) fn append_cell(builder: &mut Box<dyn ArrayBuilder>, kind: ColumnKind, cell: Option<&Value>) {
    let cell = cell.filter(|value| !value.is_null());
    match kind {
        ColumnKind::Boolean => {
            cast_builder!(builder, BooleanBuilder).append_option(cell.and_then(Value::as_bool))
        }
        ColumnKind::Int64 => {
            cast_builder!(builder, Int64Builder).append_option(cell.and_then(Value::as_i64))
        }
        ColumnKind::Float64 => {
            cast_builder!(builder, Float64Builder).append_option(cell.and_then(Value::as_f64))
        }
        ColumnKind::Utf8 => {
            let b = cast_builder!(builder, StringBuilder);
            match cell {
                Some(Value::String(text)) => b.append_value(text),
                Some(other) => b.append_value(other.to_string()),
                None => b.append_null(),
            }
        }
    }
}
