//! Arrow integration layer for `comext`.
//!
//! This crate covers the tabular edges of the extractor:
//! 1. Convert a decoded [`Table`](comext_core::Table) into an Arrow
//!    `RecordBatch` for the export writers.
//! 2. Parse the delimited-text (CSV) body served by the secondary endpoint
//!    into a [`Table`](comext_core::Table).
//!
//! Column types are inferred from the cells:
//! - integers → `Int64`, any other number → `Float64`, mixed → `Float64`;
//! - booleans → `Boolean`;
//! - everything else → `Utf8` (nested JSON values as JSON text).
//!
//! # Typical Flow
//! ```rust
//! use comext_arrow::{delimited_text_to_table, table_to_record_batch};
//!
//! let table = delimited_text_to_table("freq,geo,OBS_VALUE\nA,DE,1.5\n").unwrap();
//! let batch = table_to_record_batch(&table).unwrap();
//! assert_eq!(batch.num_rows(), 1);
//! ```
pub mod arrow_convert;
pub mod delimited;
pub mod error;
pub mod schema_convert;

/// Re-export of [`arrow_convert::table_to_record_batch`].
pub use arrow_convert::table_to_record_batch;
/// Re-exports from [`delimited`].
pub use delimited::{delimited_text_to_table, normalize_column_name};
/// Re-export of [`error::ArrowConvertError`].
pub use error::ArrowConvertError;
/// Re-exports from [`schema_convert`].
pub use schema_convert::{ColumnKind, infer_column_kind, table_schema};
