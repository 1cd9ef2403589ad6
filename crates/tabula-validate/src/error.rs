//! Validation errors.
//!
//! Every message names the input, the offending column where there is one,
//! and both the expected and the actual values. Row numbers are 1-based data
//! rows (the header row is not counted).

use std::fmt::Write;

use thiserror::Error;

/// A value that appears on more than one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateValue {
    pub value: String,
    pub rows: Vec<usize>,
}

/// A value that failed type conformance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue {
    pub row: usize,
    pub value: String,
}

fn list_duplicates(duplicates: &[DuplicateValue]) -> String {
    let mut out = String::new();
    for (idx, dup) in duplicates.iter().enumerate() {
        if idx > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "'{}' at rows {:?}", dup.value, dup.rows);
    }
    out
}

fn list_samples(samples: &[InvalidValue]) -> String {
    let mut out = String::new();
    for (idx, sample) in samples.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "row {}: '{}'", sample.row, sample.value);
    }
    out
}

/// A structural or per-column violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Declared column count differs from the file's.
    #[error("input '{input}': expected {expected} columns, found {found}")]
    ColumnCount {
        input: String,
        expected: usize,
        found: usize,
    },

    /// A data record is wider than the declared columns.
    #[error("input '{input}': row {row} has {found} fields, expected at most {expected}")]
    RecordTooWide {
        input: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Header row differs from the declared names in membership or order.
    #[error("input '{input}': header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        input: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Null values in a non-nullable column.
    #[error("input '{input}': column '{column}' is not nullable but is empty at rows {rows:?}")]
    NullValues {
        input: String,
        column: String,
        rows: Vec<usize>,
    },

    /// Repeated values in a column that forbids duplicates.
    #[error(
        "input '{input}': column '{column}' does not allow duplicates: {}",
        list_duplicates(.duplicates)
    )]
    Duplicates {
        input: String,
        column: String,
        duplicates: Vec<DuplicateValue>,
    },

    /// Values that do not conform to the declared type.
    #[error(
        "input '{input}': column '{column}' expects {expected}; {count} invalid value(s): {}",
        list_samples(.samples)
    )]
    TypeMismatch {
        input: String,
        column: String,
        /// Declared type plus its pattern or separators.
        expected: String,
        count: usize,
        /// The first offending values.
        samples: Vec<InvalidValue>,
    },
}

impl ValidationError {
    /// The column the violation is about, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::NullValues { column, .. }
            | Self::Duplicates { column, .. }
            | Self::TypeMismatch { column, .. } => Some(column),
            Self::ColumnCount { .. } | Self::RecordTooWide { .. } | Self::HeaderMismatch { .. } => {
                None
            }
        }
    }
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_display() {
        let err = ValidationError::Duplicates {
            input: "sales".to_string(),
            column: "ID".to_string(),
            duplicates: vec![DuplicateValue {
                value: "1".to_string(),
                rows: vec![1, 3],
            }],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"input 'sales': column 'ID' does not allow duplicates: '1' at rows [1, 3]"
        );
        assert_eq!(err.column(), Some("ID"));
    }
}
