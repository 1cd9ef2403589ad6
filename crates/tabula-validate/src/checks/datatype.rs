//! Type conformance of non-null values.

use std::sync::LazyLock;

use regex::Regex;
use tabula_common::LocaleConventions;
use tabula_model::{ColumnDefinition, ColumnType, InputDefinition, Table};

use crate::error::{InvalidValue, Result, ValidationError};

const MAX_SAMPLES: usize = 5;

/// Letters (accented forms included), digits, combining marks, punctuation,
/// math/currency/modifier symbols and whitespace.
static READABLE_TEXT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N}\p{M}\p{Pc}\p{Pd}\p{Ps}\p{Pe}\p{Pi}\p{Pf}\p{Po}\p{Sm}\p{Sc}\p{Sk}\s]+$")
        .expect("Invalid readable text regex")
});

/// True when the value is made only of readable text characters.
///
/// Control characters and pictographic symbols are rejected.
pub fn is_readable_text(value: &str) -> bool {
    READABLE_TEXT_REGEX.is_match(value)
}

fn conforms(column_type: ColumnType, locale: &LocaleConventions, value: &str) -> bool {
    match column_type {
        ColumnType::Integer => locale.parse_integer(value).is_some(),
        ColumnType::Numeric => locale.parse_number(value).is_some(),
        ColumnType::Date => locale.parse_date(value).is_some(),
        ColumnType::Alphabetic => is_readable_text(value),
    }
}

fn describe(column_type: ColumnType, locale: &LocaleConventions) -> String {
    let thousands = locale
        .thousands_separator
        .map_or_else(|| "none".to_string(), |sep| format!("'{sep}'"));
    match column_type {
        ColumnType::Date => format!("date (pattern {})", locale.date_format),
        ColumnType::Integer | ColumnType::Numeric => format!(
            "{column_type} (decimal separator '{}', thousands separator {thousands})",
            locale.decimal_separator
        ),
        ColumnType::Alphabetic => "alphabetic (readable text)".to_string(),
    }
}

pub(crate) fn check(input: &InputDefinition, table: &Table, column: &ColumnDefinition) -> Result<()> {
    let Some(values) = table.column_values(column.name()) else {
        return Ok(());
    };
    let locale = input.locale();

    let mut count = 0usize;
    let mut samples = Vec::new();
    for (idx, value) in values.enumerate() {
        if value.is_null() {
            continue;
        }
        let text = value.to_text();
        if conforms(column.column_type(), locale, &text) {
            continue;
        }
        count += 1;
        if samples.len() < MAX_SAMPLES {
            samples.push(InvalidValue {
                row: idx + 1,
                value: text,
            });
        }
    }

    if count == 0 {
        return Ok(());
    }
    Err(ValidationError::TypeMismatch {
        input: input.id().to_string(),
        column: column.name().to_string(),
        expected: describe(column.column_type(), locale),
        count,
        samples,
    })
}
