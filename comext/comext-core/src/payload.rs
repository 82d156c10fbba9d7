//! Response dialects, detected once per body.

use std::{borrow::Cow, fmt};

use serde_json::{Map, Value};

use crate::{
    catalog::{Catalogs, DimensionCatalog},
    error::DecodeError,
};

/// The two JSON response shapes understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// JSON-stat: `value` + `dimension` + `id`, categories keyed by code.
    CategoryIndex,
    /// SDMX-JSON: `dataSets` + `structure.dimensions`, categories by position.
    Structure,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CategoryIndex => "category-index",
            Self::Structure => "structure",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive fields of a dataset, when the body carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetMetadata {
    pub label: Option<String>,
    pub source: Option<String>,
    pub updated: Option<String>,
}

/// A body in the category-index dialect.
#[derive(Debug)]
pub struct CategoryIndexPayload<'a> {
    dimension_order: Vec<String>,
    catalogs: Catalogs,
    values: &'a Value,
    extents: Option<Vec<usize>>,
    metadata: DatasetMetadata,
}

/// A body in the structure dialect.
#[derive(Debug)]
pub struct StructurePayload<'a> {
    dimension_order: Vec<String>,
    catalogs: Catalogs,
    observations: Option<&'a Map<String, Value>>,
    metadata: DatasetMetadata,
}

/// A parsed response body, tagged by dialect.
#[derive(Debug)]
pub enum Payload<'a> {
    CategoryIndex(CategoryIndexPayload<'a>),
    Structure(StructurePayload<'a>),
}

impl<'a> Payload<'a> {
    /// Detect the dialect of `body` and build its catalogs.
    ///
    /// The category-index dialect wins when `value`, `dimension` and `id` are
    /// all present; otherwise a `dataSets` key selects the structure dialect.
    pub fn parse(body: &'a Value) -> Result<Self, DecodeError> {
        let object = body
            .as_object()
            .ok_or_else(|| DecodeError::unrecognized("response body is not a JSON object"))?;

        if ["value", "dimension", "id"]
            .iter()
            .all(|key| object.contains_key(*key))
        {
            return CategoryIndexPayload::parse(object).map(Self::CategoryIndex);
        }
        if object.contains_key("dataSets") {
            return StructurePayload::parse(object).map(Self::Structure);
        }
        Err(DecodeError::unrecognized(
            "expected 'value'/'dimension'/'id' or 'dataSets' at top level",
        ))
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::CategoryIndex(_) => Dialect::CategoryIndex,
            Self::Structure(_) => Dialect::Structure,
        }
    }

    pub fn dimension_order(&self) -> &[String] {
        match self {
            Self::CategoryIndex(p) => &p.dimension_order,
            Self::Structure(p) => &p.dimension_order,
        }
    }

    pub fn catalogs(&self) -> &Catalogs {
        match self {
            Self::CategoryIndex(p) => &p.catalogs,
            Self::Structure(p) => &p.catalogs,
        }
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        match self {
            Self::CategoryIndex(p) => &p.metadata,
            Self::Structure(p) => &p.metadata,
        }
    }

    /// Cube extents declared by the body (JSON-stat `size`), one per dimension.
    pub fn extents(&self) -> Option<&[usize]> {
        match self {
            Self::CategoryIndex(p) => p.extents.as_deref(),
            Self::Structure(_) => None,
        }
    }

    /// Observation map entries in declared order.
    ///
    /// Dense JSON-stat value arrays are keyed by position; `null` cells are
    /// missing observations and are left out.
    pub fn observations(&self) -> Vec<(Cow<'a, str>, &'a Value)> {
        match self {
            Self::CategoryIndex(p) => match p.values {
                Value::Object(map) => map
                    .iter()
                    .map(|(key, value)| (Cow::Borrowed(key.as_str()), value))
                    .collect(),
                Value::Array(cells) => cells
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(position, value)| (Cow::Owned(position.to_string()), value))
                    .collect(),
                _ => Vec::new(),
            },
            Self::Structure(p) => p
                .observations
                .map(|map| {
                    map.iter()
                        .map(|(key, value)| (Cow::Borrowed(key.as_str()), value))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Catalogs in dimension order; dimensions without a catalog are skipped.
    pub fn into_catalogs(self) -> Vec<DimensionCatalog> {
        let catalogs = match self {
            Self::CategoryIndex(p) => p.catalogs,
            Self::Structure(p) => p.catalogs,
        };
        catalogs.into_values().collect()
    }
}

impl<'a> CategoryIndexPayload<'a> {
    fn parse(body: &'a Map<String, Value>) -> Result<Self, DecodeError> {
        let dimension_order = body
            .get("id")
            .and_then(Value::as_array)
            .ok_or_else(|| DecodeError::unrecognized("'id' is not an array"))?
            .iter()
            .map(|id| {
                id.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| DecodeError::unrecognized("'id' contains a non-string entry"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if dimension_order.is_empty() {
            return Err(DecodeError::unrecognized("'id' declares no dimension"));
        }

        let dimensions = body
            .get("dimension")
            .and_then(Value::as_object)
            .ok_or_else(|| DecodeError::unrecognized("'dimension' is not an object"))?;

        let values = body
            .get("value")
            .filter(|values| values.is_object() || values.is_array())
            .ok_or_else(|| {
                DecodeError::unrecognized("'value' is neither an object nor an array")
            })?;

        let catalogs = dimension_order
            .iter()
            .filter_map(|id| {
                dimensions
                    .get(id)
                    .map(|dimension| (id.clone(), DimensionCatalog::from_category_index(id, dimension)))
            })
            .collect();

        let extents = body
            .get("size")
            .and_then(Value::as_array)
            .and_then(|sizes| {
                sizes
                    .iter()
                    .map(|size| size.as_u64().and_then(|s| usize::try_from(s).ok()))
                    .collect::<Option<Vec<_>>>()
            })
            .filter(|sizes| sizes.len() == dimension_order.len());

        Ok(Self {
            dimension_order,
            catalogs,
            values,
            extents,
            metadata: DatasetMetadata {
                label: string_field(body, "label"),
                source: string_field(body, "source"),
                updated: string_field(body, "updated"),
            },
        })
    }
}

impl<'a> StructurePayload<'a> {
    fn parse(body: &'a Map<String, Value>) -> Result<Self, DecodeError> {
        let data_sets = body
            .get("dataSets")
            .and_then(Value::as_array)
            .ok_or_else(|| DecodeError::unrecognized("'dataSets' is not an array"))?;

        let structure_dimensions = body
            .get("structure")
            .and_then(|s| s.get("dimensions"))
            .and_then(Value::as_object);
        let dimensions: &[Value] = match structure_dimensions
            .and_then(|d| d.get("observation").or_else(|| d.get("series")))
        {
            Some(Value::Array(dimensions)) => dimensions.as_slice(),
            Some(_) => {
                return Err(DecodeError::unrecognized(
                    "structure dimensions are not an array",
                ));
            }
            None => &[],
        };

        let mut dimension_order = Vec::with_capacity(dimensions.len());
        let mut catalogs = Catalogs::with_capacity(dimensions.len());
        for dimension in dimensions {
            let catalog = DimensionCatalog::from_structure(dimension)?;
            dimension_order.push(catalog.id().to_string());
            catalogs.insert(catalog.id().to_string(), catalog);
        }

        let observations = data_sets.first().and_then(Value::as_object).and_then(|data_set| {
            data_set
                .get("observations")
                .and_then(Value::as_object)
                .filter(|observations| !observations.is_empty())
                .or_else(|| data_set.get("series").and_then(Value::as_object))
        });

        let structure = body.get("structure");
        let meta = body.get("meta");
        Ok(Self {
            dimension_order,
            catalogs,
            observations,
            metadata: DatasetMetadata {
                label: structure
                    .and_then(|s| s.get("name").or_else(|| s.get("label")))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                source: meta
                    .and_then(|m| m.get("sender"))
                    .and_then(|s| s.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                updated: meta
                    .and_then(|m| m.get("prepared"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
        })
    }
}

fn string_field(body: &Map<String, Value>, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}
