//! Error types for schema construction.

use std::path::PathBuf;

use thiserror::Error;

/// A declared column type outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unknown column type '{type_name}' for {context} (expected one of: alphabetic, date, integer, numeric)"
)]
pub struct UnknownTypeError {
    pub type_name: String,
    /// What declared the type, e.g. `column 'ID'` or `export type of 'PRICE'`.
    pub context: String,
}

/// Errors raised while building schema objects from declarative descriptions.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Required fields absent from a description.
    #[error("missing keys in {entity}: {}", .fields.join(", "))]
    MissingFields { entity: String, fields: Vec<String> },

    /// A field is present but its value is not acceptable.
    #[error("invalid `{field}` in {entity}: {reason}")]
    InvalidField {
        entity: String,
        field: String,
        reason: String,
    },

    /// Description does not have the expected JSON shape.
    #[error("malformed {entity}: {message}")]
    Malformed { entity: String, message: String },

    /// Column positions are not the permutation 1..N.
    #[error("column positions must be contiguous starting at 1 in {entity}; found {positions:?}")]
    NonContiguousPositions { entity: String, positions: Vec<i64> },

    /// Two columns share a name, ignoring case.
    #[error("duplicate column name '{name}' (case-insensitive) in {entity}")]
    DuplicateColumnName { entity: String, name: String },

    /// Output column declares both `source` and `compute`.
    #[error("output column '{name}' must have either `source` or `compute`, not both")]
    AmbiguousOutputColumn { name: String },

    /// Output column declares neither `source` nor `compute`.
    #[error("output column '{name}' needs one of `source` or `compute`")]
    UnmappedOutputColumn { name: String },

    /// Declared type outside the fixed set.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// Two active inputs share an id.
    #[error("duplicate input id '{id}'")]
    DuplicateInputId { id: String },

    /// Two active outputs share an id.
    #[error("duplicate output id '{id}'")]
    DuplicateOutputId { id: String },

    /// Output references an input id that is not active.
    #[error("output '{output}' references unknown input_id '{input}'")]
    UnknownInput { output: String, input: String },

    /// Output column copies a column the input does not declare.
    #[error("output '{output}' column '{column}' copies unknown input column '{source_column}' of '{input}'")]
    UnknownSourceColumn {
        output: String,
        column: String,
        source_column: String,
        input: String,
    },

    /// Description file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    pub(crate) fn invalid(
        entity: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            entity: entity.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_display() {
        let err = SchemaError::MissingFields {
            entity: "column definition".to_string(),
            fields: vec!["name".to_string(), "type".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing keys in column definition: name, type"
        );
    }

    #[test]
    fn test_unknown_type_is_transparent() {
        let err: SchemaError = UnknownTypeError {
            type_name: "text".to_string(),
            context: "column 'NAME'".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "unknown column type 'text' for column 'NAME' (expected one of: alphabetic, date, integer, numeric)"
        );
    }
}
