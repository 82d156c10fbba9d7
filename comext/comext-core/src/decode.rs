//! Observation map → [`Table`] decoding.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    catalog::LabelStyle,
    error::DecodeError,
    key::{DEFAULT_KEY_DELIMITER, KeyDecoder},
    payload::Payload,
    row::{OBS_VALUE, build_row},
    table::Table,
};

/// Options applied while decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Separator between per-dimension indices in observation keys.
    pub key_delimiter: String,
    pub label_style: LabelStyle,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            key_delimiter: DEFAULT_KEY_DELIMITER.to_string(),
            label_style: LabelStyle::default(),
        }
    }
}

impl DecodeOptions {
    pub fn with_key_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.key_delimiter = delimiter.into();
        self
    }

    pub fn with_label_style(mut self, style: LabelStyle) -> Self {
        self.label_style = style;
        self
    }
}

/// Detect the dialect of `body` and decode it into a table.
///
/// # Errors
///
/// - [`DecodeError::UnrecognizedDialect`] if the body matches neither dialect.
/// - [`DecodeError::NoObservations`] if no observation could be decoded.
pub fn decode(body: &Value, options: &DecodeOptions) -> Result<Table, DecodeError> {
    let payload = Payload::parse(body)?;
    decode_payload(&payload, options)
}

/// Decode an already parsed payload.
///
/// Observations with malformed keys are dropped; the rest are kept in
/// declared order.
pub fn decode_payload(payload: &Payload<'_>, options: &DecodeOptions) -> Result<Table, DecodeError> {
    let keys = KeyDecoder::new(&options.key_delimiter)
        .with_extents(payload.extents().map(<[usize]>::to_vec));
    let order = payload.dimension_order();
    let catalogs = payload.catalogs();
    let observations = payload.observations();

    let mut rows = Vec::with_capacity(observations.len());
    let mut skipped = 0usize;
    let mut widest = 0usize;

    for (key, value) in observations {
        let indices = match keys.decode(&key) {
            Ok(indices) => indices,
            Err(err) => {
                debug!(error = %err, "skipping observation");
                skipped += 1;
                continue;
            }
        };
        widest = widest.max(indices.len().min(order.len()));
        rows.push(build_row(&indices, order, catalogs, value, options.label_style));
    }

    if skipped > 0 {
        warn!(
            dialect = %payload.dialect(),
            skipped,
            decoded = rows.len(),
            "dropped observations with malformed keys"
        );
    }
    if rows.is_empty() {
        return Err(DecodeError::NoObservations);
    }

    let mut columns: Vec<String> = Vec::with_capacity(widest + 1);
    for dimension in &order[..widest] {
        let column = dimension.to_uppercase();
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    if !columns.iter().any(|c| c == OBS_VALUE) {
        columns.push(OBS_VALUE.to_string());
    }

    debug!(
        dialect = %payload.dialect(),
        rows = rows.len(),
        columns = columns.len(),
        "decoded observations"
    );
    Ok(Table::new(columns, rows))
}
