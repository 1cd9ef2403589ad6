//! Uniqueness check.

use std::collections::HashMap;

use tabula_model::{ColumnDefinition, ColumnType, InputDefinition, LocaleConventions, Table};

use crate::error::{DuplicateValue, Result, ValidationError};

/// Identity of a cell for duplicate detection.
///
/// Integer and numeric cells compare by parsed value under the input's
/// locale, so `1`, `01` and `1.0` collide. Cells that do not parse fall back
/// to their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Integer(i64),
    Number(u64),
    Text(&'a str),
}

impl<'a> CellKey<'a> {
    fn new(text: &'a str, column_type: ColumnType, locale: &LocaleConventions) -> Self {
        let parsed = match column_type {
            ColumnType::Integer => locale.parse_integer(text).map(CellKey::Integer),
            // -0.0 and 0.0 are the same number
            ColumnType::Numeric => locale
                .parse_number(text)
                .map(|number| CellKey::Number((number + 0.0).to_bits())),
            ColumnType::Alphabetic | ColumnType::Date => None,
        };
        parsed.unwrap_or(CellKey::Text(text))
    }
}

/// Every row holding a repeated value is reported, including the first
/// occurrence. Duplicates are listed in order of first appearance and carry
/// the cell text of that first occurrence.
pub(crate) fn check(input: &InputDefinition, table: &Table, column: &ColumnDefinition) -> Result<()> {
    let Some(values) = table.column_values(column.name()) else {
        return Ok(());
    };

    let mut first_seen: Vec<(CellKey<'_>, &str)> = Vec::new();
    let mut rows_by_key: HashMap<CellKey<'_>, Vec<usize>> = HashMap::new();
    for (idx, value) in values.enumerate() {
        if value.is_null() {
            continue;
        }
        let Some(text) = value.as_str() else {
            continue;
        };
        let key = CellKey::new(text, column.column_type(), input.locale());
        let rows = rows_by_key.entry(key).or_default();
        if rows.is_empty() {
            first_seen.push((key, text));
        }
        rows.push(idx + 1);
    }

    let duplicates: Vec<DuplicateValue> = first_seen
        .into_iter()
        .filter_map(|(key, text)| {
            let rows = rows_by_key.remove(&key)?;
            (rows.len() > 1).then(|| DuplicateValue {
                value: text.to_string(),
                rows,
            })
        })
        .collect();
    if duplicates.is_empty() {
        return Ok(());
    }
    Err(ValidationError::Duplicates {
        input: input.id().to_string(),
        column: column.name().to_string(),
        duplicates,
    })
}
