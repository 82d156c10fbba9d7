//! Transport-agnostic decoding core for `comext`.
//!
//! This crate turns a parsed statistical response body (JSON-stat or
//! SDMX-JSON) into a row-oriented [`Table`]: observation keys are split into
//! per-dimension indices, every index is resolved through its
//! [`DimensionCatalog`], and the observation value is attached as `OBS_VALUE`.

mod catalog;
mod decode;
mod error;
mod key;
mod payload;
mod row;
mod table;

pub use catalog::{
    Catalogs, Category, DimensionCatalog, LabelStyle, format_catalogs, resolve_label,
};
pub use decode::{DecodeOptions, decode, decode_payload};
pub use error::DecodeError;
pub use key::{DEFAULT_KEY_DELIMITER, KeyDecoder, decode_key, unravel_linear_index};
pub use payload::{CategoryIndexPayload, DatasetMetadata, Dialect, Payload, StructurePayload};
pub use row::{OBS_VALUE, Row, build_row, observation_primitive};
pub use table::Table;
