//! Input table definitions.

use std::path::Path;

use serde::Deserialize;
use tabula_common::{LocaleConventions, eq_fold, is_valid_pattern};

use crate::column::{ColumnDefinition, check_column_set};
use crate::error::{Result, SchemaError};
use crate::payload::{delimiter, ensure_present, parse_raw, read_json_file, required, single_char};

#[derive(Debug, Deserialize)]
struct RawInput {
    id: Option<String>,
    #[serde(alias = "fileName")]
    file_name: Option<String>,
    delimiter: Option<String>,
    encoding: Option<String>,
    #[serde(alias = "hasHeaders")]
    has_headers: Option<bool>,
    #[serde(alias = "decimalSeparator")]
    decimal_separator: Option<String>,
    #[serde(alias = "thousandsSeparator")]
    thousands_separator: Option<String>,
    #[serde(alias = "dateFormat")]
    date_format: Option<String>,
    columns: Option<Vec<serde_json::Value>>,
}

/// Structural contract and locale conventions of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDefinition {
    id: String,
    file_name: String,
    delimiter: u8,
    encoding: String,
    has_headers: bool,
    locale: LocaleConventions,
    columns: Vec<ColumnDefinition>,
}

impl InputDefinition {
    /// Parses an input description.
    ///
    /// Every field is required. Columns are returned sorted by position.
    pub fn from_value(payload: serde_json::Value) -> Result<Self> {
        let raw: RawInput = parse_raw(payload, "input definition")?;
        let entity = match &raw.id {
            Some(id) => format!("input definition '{}'", id.trim()),
            None => "input definition".to_string(),
        };
        ensure_present(
            &entity,
            &[
                ("id", raw.id.is_some()),
                ("file_name", raw.file_name.is_some()),
                ("delimiter", raw.delimiter.is_some()),
                ("encoding", raw.encoding.is_some()),
                ("has_headers", raw.has_headers.is_some()),
                ("decimal_separator", raw.decimal_separator.is_some()),
                ("thousands_separator", raw.thousands_separator.is_some()),
                ("date_format", raw.date_format.is_some()),
                ("columns", raw.columns.is_some()),
            ],
        )?;

        let id = required(raw.id, &entity, "id")?.trim().to_string();
        if id.is_empty() {
            return Err(SchemaError::invalid(&entity, "id", "must not be blank"));
        }
        let file_name = required(raw.file_name, &entity, "file_name")?.trim().to_string();
        if file_name.is_empty() {
            return Err(SchemaError::invalid(&entity, "file_name", "must not be blank"));
        }
        let delimiter = delimiter(&required(raw.delimiter, &entity, "delimiter")?, &entity, "delimiter")?;
        let encoding = required(raw.encoding, &entity, "encoding")?.trim().to_string();
        if encoding_rs::Encoding::for_label(encoding.as_bytes()).is_none() {
            return Err(SchemaError::invalid(
                &entity,
                "encoding",
                format!("unknown encoding label '{encoding}'"),
            ));
        }

        let decimal_raw = required(raw.decimal_separator, &entity, "decimal_separator")?;
        let decimal_separator = single_char(&decimal_raw, &entity, "decimal_separator", false)?
            .ok_or_else(|| SchemaError::invalid(&entity, "decimal_separator", "must not be empty"))?;
        let thousands_raw = required(raw.thousands_separator, &entity, "thousands_separator")?;
        let thousands_separator = single_char(&thousands_raw, &entity, "thousands_separator", true)?;
        if thousands_separator == Some(decimal_separator) {
            return Err(SchemaError::invalid(
                &entity,
                "thousands_separator",
                "must differ from decimal_separator",
            ));
        }
        let date_format = required(raw.date_format, &entity, "date_format")?;
        if !is_valid_pattern(&date_format) {
            return Err(SchemaError::invalid(
                &entity,
                "date_format",
                format!("'{date_format}' is not a valid date pattern"),
            ));
        }

        let mut columns = required(raw.columns, &entity, "columns")?
            .into_iter()
            .map(ColumnDefinition::from_value)
            .collect::<Result<Vec<_>>>()?;
        check_column_set(&entity, &columns)?;
        columns.sort_by_key(ColumnDefinition::position);

        Ok(Self {
            id,
            file_name,
            delimiter,
            encoding,
            has_headers: required(raw.has_headers, &entity, "has_headers")?,
            locale: LocaleConventions {
                decimal_separator,
                thousands_separator,
                date_format,
            },
            columns,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value = serde_json::from_str(text).map_err(|e| SchemaError::Malformed {
            entity: "input definition".to_string(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_value(read_json_file(path)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// The declared encoding label (validated against the WHATWG label set).
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn has_headers(&self) -> bool {
        self.has_headers
    }

    pub fn locale(&self) -> &LocaleConventions {
        &self.locale
    }

    /// Columns in position order.
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Declared column names in position order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Finds a column by exact name, falling back to a case-insensitive match.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .or_else(|| self.columns.iter().find(|c| eq_fold(c.name(), name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "id": "sales",
            "file_name": "sales.csv",
            "delimiter": ";",
            "encoding": "utf-8",
            "has_headers": true,
            "decimal_separator": ",",
            "thousands_separator": ".",
            "date_format": "%d/%m/%Y",
            "columns": [
                {"position": 2, "name": "NAME", "type": "alphabetic", "nullable": true, "allow_duplicates": true},
                {"position": 1, "name": "ID", "type": "integer", "nullable": false, "allow_duplicates": false}
            ]
        })
    }

    #[test]
    fn parses_and_orders_columns() {
        let input = InputDefinition::from_value(payload()).unwrap();
        assert_eq!(input.id(), "sales");
        assert_eq!(input.delimiter(), b';');
        assert_eq!(input.column_names(), vec!["ID", "NAME"]);
        assert_eq!(input.locale().decimal_separator, ',');
        assert_eq!(input.locale().thousands_separator, Some('.'));
        assert_eq!(input.column("name").map(ColumnDefinition::position), Some(2));
    }

    #[test]
    fn non_ascii_names_fold_the_same_for_collisions_and_lookups() {
        let mut p = payload();
        p["columns"][0]["name"] = json!("Ação");
        let input = InputDefinition::from_value(p.clone()).unwrap();
        assert_eq!(input.column("AÇÃO").map(ColumnDefinition::position), Some(2));

        p["columns"][1]["name"] = json!("AÇÃO");
        assert!(matches!(
            InputDefinition::from_value(p),
            Err(SchemaError::DuplicateColumnName { .. })
        ));
    }

    #[test]
    fn empty_thousands_separator_means_none() {
        let mut p = payload();
        p["thousands_separator"] = json!("");
        let input = InputDefinition::from_value(p).unwrap();
        assert_eq!(input.locale().thousands_separator, None);
    }

    #[test]
    fn rejects_equal_separators() {
        let mut p = payload();
        p["thousands_separator"] = json!(",");
        assert!(matches!(
            InputDefinition::from_value(p),
            Err(SchemaError::InvalidField { ref field, .. }) if field == "thousands_separator"
        ));
    }

    #[test]
    fn rejects_unknown_encoding() {
        let mut p = payload();
        p["encoding"] = json!("klingon-8");
        assert!(matches!(
            InputDefinition::from_value(p),
            Err(SchemaError::InvalidField { ref field, .. }) if field == "encoding"
        ));
    }

    #[test]
    fn rejects_case_insensitive_duplicate_names() {
        let mut p = payload();
        p["columns"][0]["name"] = json!("id");
        let err = InputDefinition::from_value(p).unwrap_err();
        assert_eq!(
            err.to_string(),
            "duplicate column name 'ID' (case-insensitive) in input definition 'sales'"
        );
    }

    #[test]
    fn missing_fields_are_listed() {
        let err = InputDefinition::from_value(json!({"id": "x", "columns": []})).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"missing keys in input definition 'x': date_format, decimal_separator, delimiter, encoding, file_name, has_headers, thousands_separator"
        );
    }
}
