//! Column definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use tabula_common::fold_case;

use crate::error::{Result, SchemaError, UnknownTypeError};
use crate::payload::{ensure_present, parse_raw, required};

/// The fixed set of column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Numeric,
    Date,
    Alphabetic,
}

impl ColumnType {
    pub const ALL: [ColumnType; 4] = [
        ColumnType::Integer,
        ColumnType::Numeric,
        ColumnType::Date,
        ColumnType::Alphabetic,
    ];

    /// Returns the declared name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Alphabetic => "alphabetic",
        }
    }

    /// Parses a declared type name; `context` names the declaring entity in the error.
    pub fn parse(name: &str, context: impl Into<String>) -> std::result::Result<Self, UnknownTypeError> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == name)
            .ok_or_else(|| UnknownTypeError {
                type_name: name.to_string(),
                context: context.into(),
            })
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawColumn {
    position: Option<i64>,
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    column_type: Option<String>,
    nullable: Option<bool>,
    #[serde(alias = "allowDuplicates")]
    allow_duplicates: Option<bool>,
}

/// One declared column of an input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    position: usize,
    name: String,
    description: String,
    column_type: ColumnType,
    nullable: bool,
    allow_duplicates: bool,
}

impl ColumnDefinition {
    /// Builds a column directly; used by tests and programmatic schemas.
    pub fn new(position: usize, name: impl Into<String>, column_type: ColumnType) -> Result<Self> {
        let name = name.into().trim().to_string();
        if position < 1 {
            return Err(SchemaError::invalid(
                "column definition",
                "position",
                "must be a positive integer (1-based)",
            ));
        }
        if name.is_empty() {
            return Err(SchemaError::invalid("column definition", "name", "must not be blank"));
        }
        Ok(Self {
            position,
            name,
            description: String::new(),
            column_type,
            nullable: true,
            allow_duplicates: true,
        })
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parses a column description.
    ///
    /// Required: `position`, `name`, `type`, `nullable`, `allow_duplicates`.
    pub fn from_value(payload: serde_json::Value) -> Result<Self> {
        let raw: RawColumn = parse_raw(payload, "column definition")?;
        let entity = match &raw.name {
            Some(name) => format!("column definition '{}'", name.trim()),
            None => "column definition".to_string(),
        };
        ensure_present(
            &entity,
            &[
                ("position", raw.position.is_some()),
                ("name", raw.name.is_some()),
                ("type", raw.column_type.is_some()),
                ("nullable", raw.nullable.is_some()),
                ("allow_duplicates", raw.allow_duplicates.is_some()),
            ],
        )?;
        let position = required(raw.position, &entity, "position")?;
        let position = usize::try_from(position)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| {
                SchemaError::invalid(&entity, "position", format!("must be a positive integer (1-based), got {position}"))
            })?;
        let name = required(raw.name, &entity, "name")?.trim().to_string();
        if name.is_empty() {
            return Err(SchemaError::invalid(&entity, "name", "must not be blank"));
        }
        let type_name = required(raw.column_type, &entity, "type")?;
        let column_type = ColumnType::parse(type_name.trim(), format!("column '{name}'"))?;
        Ok(Self {
            position,
            name,
            description: raw.description.unwrap_or_default().trim().to_string(),
            column_type,
            nullable: required(raw.nullable, &entity, "nullable")?,
            allow_duplicates: required(raw.allow_duplicates, &entity, "allow_duplicates")?,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn allows_duplicates(&self) -> bool {
        self.allow_duplicates
    }
}

/// Checks the table-level column invariants: positions are exactly 1..N and
/// names are pairwise distinct ignoring case.
pub fn check_column_set(entity: &str, columns: &[ColumnDefinition]) -> Result<()> {
    if columns.is_empty() {
        return Err(SchemaError::invalid(entity, "columns", "must declare at least one column"));
    }
    let mut positions: Vec<usize> = columns.iter().map(ColumnDefinition::position).collect();
    positions.sort_unstable();
    let contiguous = positions
        .iter()
        .enumerate()
        .all(|(idx, position)| *position == idx + 1);
    if !contiguous {
        return Err(SchemaError::NonContiguousPositions {
            entity: entity.to_string(),
            positions: positions.iter().map(|p| *p as i64).collect(),
        });
    }
    let mut seen = std::collections::HashSet::new();
    for column in columns {
        if !seen.insert(fold_case(&column.name)) {
            return Err(SchemaError::DuplicateColumnName {
                entity: entity.to_string(),
                name: column.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "position": 1,
            "name": " ID ",
            "description": "identifier",
            "type": "integer",
            "nullable": false,
            "allow_duplicates": false
        })
    }

    #[test]
    fn parses_complete_description() {
        let column = ColumnDefinition::from_value(payload()).unwrap();
        assert_eq!(column.position(), 1);
        assert_eq!(column.name(), "ID");
        assert_eq!(column.column_type(), ColumnType::Integer);
        assert!(!column.is_nullable());
        assert!(!column.allows_duplicates());
    }

    #[test]
    fn accepts_camel_case_alias() {
        let column = ColumnDefinition::from_value(json!({
            "position": 2, "name": "NAME", "type": "alphabetic",
            "nullable": true, "allowDuplicates": true
        }))
        .unwrap();
        assert!(column.allows_duplicates());
    }

    #[test]
    fn reports_all_missing_fields() {
        let err = ColumnDefinition::from_value(json!({"name": "X"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing keys in column definition 'X': allow_duplicates, nullable, position, type"
        );
    }

    #[test]
    fn rejects_non_positive_position() {
        let mut p = payload();
        p["position"] = json!(0);
        let err = ColumnDefinition::from_value(p).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "position"));
    }

    #[test]
    fn rejects_unknown_type() {
        let mut p = payload();
        p["type"] = json!("text");
        let err = ColumnDefinition::from_value(p).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType(ref e) if e.type_name == "text"));
    }

    #[test]
    fn rejects_wrong_json_type() {
        let mut p = payload();
        p["nullable"] = json!("yes");
        let err = ColumnDefinition::from_value(p).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[test]
    fn column_set_detects_gaps_and_duplicates() {
        let a = ColumnDefinition::new(1, "A", ColumnType::Integer).unwrap();
        let c = ColumnDefinition::new(3, "C", ColumnType::Integer).unwrap();
        assert!(matches!(
            check_column_set("t", &[a.clone(), c]),
            Err(SchemaError::NonContiguousPositions { .. })
        ));
        let dup = ColumnDefinition::new(2, "a", ColumnType::Date).unwrap();
        assert!(matches!(
            check_column_set("t", &[a, dup]),
            Err(SchemaError::DuplicateColumnName { .. })
        ));
    }
}
