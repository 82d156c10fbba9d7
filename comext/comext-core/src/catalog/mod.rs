//! Per-dimension category catalogs and index-to-label resolution.

mod format;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DecodeError;

pub use format::format_catalogs;

/// Catalogs of one payload keyed by dimension id, in declared order.
pub type Catalogs = IndexMap<String, DimensionCatalog>;

/// Which text a resolved dimension cell carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    /// Category label when declared, otherwise the category code.
    #[default]
    Label,
    /// Always the category code (`DE`, `EXP`, ...).
    Code,
}

/// One admissible value of a dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub code: String,
    pub index: usize,
    pub label: Option<String>,
}

impl Category {
    pub fn new(code: impl Into<String>, index: usize, label: Option<String>) -> Self {
        Self {
            code: code.into(),
            index,
            label,
        }
    }

    pub fn text(&self, style: LabelStyle) -> &str {
        match style {
            LabelStyle::Label => self.label.as_deref().unwrap_or(&self.code),
            LabelStyle::Code => &self.code,
        }
    }
}

/// Declared categories of one dimension together with an index→category
/// inverse map.
///
/// The inverse map is built once on construction. When several categories
/// declare the same index the first declared one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionCatalog {
    id: String,
    label: Option<String>,
    categories: Vec<Category>,
    by_index: HashMap<usize, usize>,
}

impl DimensionCatalog {
    pub fn new(id: impl Into<String>, label: Option<String>, categories: Vec<Category>) -> Self {
        let id = id.into();
        let mut by_index = HashMap::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            if let Some(&first) = by_index.get(&category.index) {
                let first: &Category = &categories[first];
                warn!(
                    dimension = %id,
                    index = category.index,
                    kept = %first.code,
                    ignored = %category.code,
                    "duplicate category index in catalog"
                );
                continue;
            }
            by_index.insert(category.index, position);
        }
        Self {
            id,
            label,
            categories,
            by_index,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Categories in declared order, duplicates included.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, index: usize) -> Option<&Category> {
        self.by_index
            .get(&index)
            .map(|&position| &self.categories[position])
    }

    pub fn resolve(&self, index: usize, style: LabelStyle) -> Option<&str> {
        self.category(index).map(|category| category.text(style))
    }

    /// Build a catalog from a JSON-stat `dimension.<id>` object.
    ///
    /// `category.index` may be a `{code: index}` object or an array of codes;
    /// when it is absent the order of `category.label` defines the indices.
    /// Entries whose index is not a non-negative integer are skipped.
    pub(crate) fn from_category_index(id: &str, dimension: &Value) -> Self {
        let category = dimension.get("category");
        let labels = category
            .and_then(|c| c.get("label"))
            .and_then(Value::as_object);

        let entries: Vec<(String, usize)> = match category.and_then(|c| c.get("index")) {
            Some(Value::Object(index)) => index
                .iter()
                .filter_map(|(code, raw)| match as_index(raw) {
                    Some(index) => Some((code.clone(), index)),
                    None => {
                        warn!(dimension = id, code = %code, index = %raw, "skipping category with invalid index");
                        None
                    }
                })
                .collect(),
            Some(Value::Array(codes)) => codes
                .iter()
                .enumerate()
                .filter_map(|(position, code)| code.as_str().map(|c| (c.to_string(), position)))
                .collect(),
            _ => labels
                .map(|labels| {
                    labels
                        .keys()
                        .enumerate()
                        .map(|(position, code)| (code.clone(), position))
                        .collect()
                })
                .unwrap_or_default(),
        };

        let categories = entries
            .into_iter()
            .map(|(code, index)| {
                let label = labels
                    .and_then(|labels| labels.get(&code))
                    .and_then(localized_text);
                Category::new(code, index, label)
            })
            .collect();

        Self::new(
            id,
            dimension.get("label").and_then(localized_text),
            categories,
        )
    }

    /// Build a catalog from one SDMX-JSON `structure.dimensions.*` entry.
    /// Category indices are positions in its `values` array.
    pub(crate) fn from_structure(dimension: &Value) -> Result<Self, DecodeError> {
        let id = dimension
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::unrecognized("structure dimension without an 'id'"))?;

        let categories = dimension
            .get("values")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .enumerate()
                    .map(|(position, value)| {
                        let code = value
                            .get("id")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| position.to_string());
                        let label = value
                            .get("label")
                            .or_else(|| value.get("name"))
                            .and_then(localized_text);
                        Category::new(code, position, label)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let label = dimension
            .get("label")
            .or_else(|| dimension.get("name"))
            .and_then(localized_text);
        Ok(Self::new(id, label, categories))
    }
}

/// Resolve `index` to display text, degrading to the stringified index when
/// the catalog is missing or does not declare it.
pub fn resolve_label(
    catalog: Option<&DimensionCatalog>,
    index: usize,
    style: LabelStyle,
) -> String {
    match catalog.and_then(|catalog| catalog.resolve(index, style)) {
        Some(text) => text.to_string(),
        None => {
            debug!(
                dimension = catalog.map(DimensionCatalog::id).unwrap_or("<missing>"),
                index, "index not declared in catalog; using raw index"
            );
            index.to_string()
        }
    }
}

fn as_index(value: &Value) -> Option<usize> {
    value.as_u64().and_then(|v| usize::try_from(v).ok())
}

/// Text of a label that is either a plain string or a `{lang: text}` object
/// (English preferred).
fn localized_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(by_lang) => by_lang
            .get("en")
            .or_else(|| by_lang.values().next())
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
