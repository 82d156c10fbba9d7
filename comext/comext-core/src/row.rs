//! Flat records built from decoded observations.

use indexmap::IndexMap;
use serde_json::Value;

use crate::catalog::{Catalogs, LabelStyle, resolve_label};

/// Column holding the observation value of every row.
pub const OBS_VALUE: &str = "OBS_VALUE";

/// One flat record: column name → cell value.
///
/// Dimension cells are strings; the `OBS_VALUE` cell keeps the JSON value
/// the source provided.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: IndexMap<String, Value>,
}

impl Row {
    pub fn from_cells(cells: IndexMap<String, Value>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn obs_value(&self) -> Option<&Value> {
        self.get(OBS_VALUE)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Build the row of one observation.
///
/// Position `i` of `indices` is resolved against the catalog of
/// `dimension_order[i]` and stored under the upper-cased dimension name.
/// Positions beyond either sequence are ignored. `OBS_VALUE` is always set.
pub fn build_row(
    indices: &[usize],
    dimension_order: &[String],
    catalogs: &Catalogs,
    observation: &Value,
    style: LabelStyle,
) -> Row {
    let mut cells = IndexMap::with_capacity(dimension_order.len().min(indices.len()) + 1);
    for (dimension, &index) in dimension_order.iter().zip(indices) {
        let text = resolve_label(catalogs.get(dimension), index, style);
        cells.insert(dimension.to_uppercase(), Value::String(text));
    }
    cells.insert(OBS_VALUE.to_string(), observation_primitive(observation));
    Row { cells }
}

/// Unwrap the primitive value of an observation.
///
/// Non-empty arrays yield their first element, objects their `value` field;
/// everything else (including objects without `value`) passes through as is.
pub fn observation_primitive(observation: &Value) -> Value {
    match observation {
        Value::Array(items) if !items.is_empty() => items[0].clone(),
        Value::Object(fields) => fields
            .get("value")
            .cloned()
            .unwrap_or_else(|| observation.clone()),
        other => other.clone(),
    }
}
