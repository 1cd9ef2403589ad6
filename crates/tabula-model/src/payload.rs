//! Helpers shared by the description parsers.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Result, SchemaError};

/// Deserializes a description into its raw (all-optional) form.
pub(crate) fn parse_raw<T: DeserializeOwned>(value: serde_json::Value, entity: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SchemaError::Malformed {
        entity: entity.to_string(),
        message: e.to_string(),
    })
}

/// Fails with every missing field listed (sorted) when any check is false.
pub(crate) fn ensure_present(entity: &str, checks: &[(&str, bool)]) -> Result<()> {
    let mut missing: Vec<String> = checks
        .iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| (*field).to_string())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(SchemaError::MissingFields {
        entity: entity.to_string(),
        fields: missing,
    })
}

pub(crate) fn required<T>(value: Option<T>, entity: &str, field: &str) -> Result<T> {
    value.ok_or_else(|| SchemaError::MissingFields {
        entity: entity.to_string(),
        fields: vec![field.to_string()],
    })
}

/// Parses a one-character setting. Empty is allowed only when `optional`.
pub(crate) fn single_char(
    value: &str,
    entity: &str,
    field: &str,
    optional: bool,
) -> Result<Option<char>> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (None, _) if optional => Ok(None),
        (Some(ch), None) => Ok(Some(ch)),
        _ => Err(SchemaError::invalid(
            entity,
            field,
            format!("expected a single character, got {value:?}"),
        )),
    }
}

/// Parses a delimiter, which must be a single byte for the CSV reader and writer.
pub(crate) fn delimiter(value: &str, entity: &str, field: &str) -> Result<u8> {
    match single_char(value, entity, field, false)? {
        Some(ch) if ch.is_ascii() => Ok(ch as u8),
        _ => Err(SchemaError::invalid(
            entity,
            field,
            format!("expected a single ASCII character, got {value:?}"),
        )),
    }
}

/// Reads a JSON description file.
pub(crate) fn read_json_file(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| SchemaError::Malformed {
        entity: path.display().to_string(),
        message: e.to_string(),
    })
}
