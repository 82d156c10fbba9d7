use std::fmt::{Error, Result, Write as _};

use super::DimensionCatalog;

/// Format catalogs for display: one header line per dimension followed by
/// its categories as `index: code  label`, at most `limit` per dimension.
pub fn format_catalogs(
    catalogs: impl AsRef<[DimensionCatalog]>,
    limit: Option<usize>,
) -> std::result::Result<String, Error> {
    let mut out = String::new();
    for catalog in catalogs.as_ref() {
        format_catalog(catalog, limit, &mut out)?;
    }
    Ok(out)
}

fn format_catalog(catalog: &DimensionCatalog, limit: Option<usize>, out: &mut String) -> Result {
    match catalog.label() {
        Some(label) => write!(out, "{} ({label})", catalog.id())?,
        None => write!(out, "{}", catalog.id())?,
    }
    writeln!(out, ": {} categories", catalog.len())?;

    let shown = limit.unwrap_or(usize::MAX).min(catalog.len());
    for category in &catalog.categories()[..shown] {
        match &category.label {
            Some(label) => writeln!(out, "    {}: {}  {label}", category.index, category.code)?,
            None => writeln!(out, "    {}: {}", category.index, category.code)?,
        }
    }
    if shown < catalog.len() {
        writeln!(out, "    ... {} more", catalog.len() - shown)?;
    }
    Ok(())
}
