use arrow::array::{ArrayBuilder, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};

use crate::schema_convert::ColumnKind;

pub(super) fn make_builder(kind: ColumnKind, capacity: usize) -> Box<dyn ArrayBuilder> {
    match kind {
        ColumnKind::Boolean => Box::new(BooleanBuilder::with_capacity(capacity)),
        ColumnKind::Int64 => Box::new(Int64Builder::with_capacity(capacity)),
        ColumnKind::Float64 => Box::new(Float64Builder::with_capacity(capacity)),
        ColumnKind::Utf8 => Box::new(StringBuilder::with_capacity(capacity, capacity * 16)),
    }
}
