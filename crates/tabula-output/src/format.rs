//! Locale-aware rendering of derived tables.
//!
//! Each column is rendered by the rule of its resolved type, using the
//! decimal separator, thousands separator and date pattern of the input the
//! table was derived from. Formatting is idempotent: feeding a rendered value
//! back through the same rule yields the same text.

use tabula_common::{LocaleConventions, format_fixed, format_integral, format_with_pattern};
use tabula_model::{ColumnType, InputDefinition, OutputDefinition, Value};
use tabula_transform::{ColumnOrigin, DerivedTable};

use crate::error::{OutputError, Result};

/// Header plus text rows, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FormattedTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Type used to render a derived column.
///
/// An export-type override on the output wins. Otherwise a copied column takes
/// the type of its source column in the originating input. Computed columns
/// without an override have no type and pass through untouched.
pub fn resolve_column_type(
    column: &str,
    origin: &ColumnOrigin,
    output: &OutputDefinition,
    input: &InputDefinition,
) -> Option<ColumnType> {
    output.export_type(column).or_else(|| {
        origin
            .source_column()
            .and_then(|source| input.column(source))
            .map(|definition| definition.column_type())
    })
}

/// Renders one value under the given type and locale.
pub fn format_value(value: &Value, column_type: Option<ColumnType>, locale: &LocaleConventions) -> String {
    match column_type {
        Some(ColumnType::Numeric) => format_numeric(value, locale),
        Some(ColumnType::Integer) => format_integer(value, locale),
        Some(ColumnType::Date) => format_date(value, locale),
        Some(ColumnType::Alphabetic) | None => value.to_text(),
    }
}

fn format_numeric(value: &Value, locale: &LocaleConventions) -> String {
    let decimal = locale.decimal_separator;
    match value {
        Value::Null => String::new(),
        Value::Integer(v) => format_fixed(*v as f64, 2, decimal),
        Value::Float(v) if v.is_finite() => format_fixed(*v, 2, decimal),
        Value::Text(text) if text.trim().is_empty() => String::new(),
        Value::Text(text) => locale
            .parse_number_tolerant(text)
            .map_or_else(|| text.clone(), |number| format_fixed(number, 2, decimal)),
        other => other.to_text(),
    }
}

fn format_integer(value: &Value, locale: &LocaleConventions) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(v) => v.to_string(),
        Value::Float(v) if !v.is_finite() => String::new(),
        Value::Float(v) => format_integral(*v).unwrap_or_else(|| {
            v.to_string()
                .replace('.', &locale.decimal_separator.to_string())
        }),
        other => {
            let text = other.to_text();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return String::new();
            }
            if let Some(parsed) = locale.parse_integer(trimmed) {
                return parsed.to_string();
            }
            match locale.parse_number_tolerant(trimmed) {
                Some(number) => format_integral(number).unwrap_or_else(|| trimmed.to_string()),
                None => String::new(),
            }
        }
    }
}

fn format_date(value: &Value, locale: &LocaleConventions) -> String {
    if value.is_null() {
        return String::new();
    }
    locale
        .parse_date_tolerant(&value.to_text())
        .and_then(|date| format_with_pattern(&date, &locale.date_format))
        .unwrap_or_default()
}

/// Renders every cell of a derived table.
///
/// Locale conventions come from `input`, the definition the output derives
/// from, never from the output itself.
pub fn format_table(
    derived: &DerivedTable,
    output: &OutputDefinition,
    input: &InputDefinition,
) -> Result<FormattedTable> {
    if derived.output_id() != output.id() {
        return Err(OutputError::DefinitionMismatch {
            output: output.id().to_string(),
            expected: output.id().to_string(),
            found: derived.output_id().to_string(),
        });
    }
    if derived.input_id() != input.id() || output.input_id() != input.id() {
        return Err(OutputError::DefinitionMismatch {
            output: output.id().to_string(),
            expected: output.input_id().to_string(),
            found: input.id().to_string(),
        });
    }

    let table = derived.table();
    let types: Vec<Option<ColumnType>> = table
        .columns()
        .iter()
        .zip(derived.origins())
        .map(|(column, origin)| resolve_column_type(column, origin, output, input))
        .collect();
    tracing::debug!(
        output_id = output.id(),
        typed = types.iter().filter(|t| t.is_some()).count(),
        untyped = types.iter().filter(|t| t.is_none()).count(),
        "resolved output column types"
    );

    let locale = input.locale();
    let rows = table
        .rows()
        .map(|row| {
            row.values()
                .iter()
                .zip(&types)
                .map(|(value, column_type)| format_value(value, *column_type, locale))
                .collect()
        })
        .collect();

    Ok(FormattedTable::new(table.columns().to_vec(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn brazilian() -> LocaleConventions {
        LocaleConventions {
            decimal_separator: ',',
            thousands_separator: Some('.'),
            date_format: "%d/%m/%Y".to_string(),
        }
    }

    fn numeric(value: impl Into<Value>, locale: &LocaleConventions) -> String {
        format_value(&value.into(), Some(ColumnType::Numeric), locale)
    }

    fn integer(value: impl Into<Value>, locale: &LocaleConventions) -> String {
        format_value(&value.into(), Some(ColumnType::Integer), locale)
    }

    #[test]
    fn test_numeric_strips_grouping_and_fixes_two_decimals() {
        let locale = brazilian();
        assert_eq!(numeric("1.234,50", &locale), "1234,50");
        assert_eq!(numeric("12", &locale), "12,00");
        assert_eq!(numeric(1669.0, &locale), "1669,00");
        assert_eq!(numeric(7i64, &locale), "7,00");
        assert_eq!(numeric(Value::Null, &locale), "");
        assert_eq!(numeric("  ", &locale), "");
        assert_eq!(numeric("n/a", &locale), "n/a");
    }

    #[test]
    fn test_numeric_accepts_either_decimal_mark() {
        let locale = LocaleConventions::default();
        assert_eq!(numeric("2,5", &locale), "2.50");
        assert_eq!(numeric("2.5", &locale), "2.50");
    }

    #[test]
    fn test_integer_drops_fraction_artifacts() {
        let locale = brazilian();
        assert_eq!(integer("3,00", &locale), "3");
        assert_eq!(integer(3.0, &locale), "3");
        assert_eq!(integer("1.000", &locale), "1000");
        assert_eq!(integer(" 42 ", &locale), "42");
        assert_eq!(integer(" 3,5 ", &locale), "3,5");
        assert_eq!(integer("abc", &locale), "");
        assert_eq!(integer(Value::Null, &locale), "");
        assert_eq!(integer(3.0, &LocaleConventions::default()), "3");
        assert_eq!(integer(12.5, &locale), "12,5");
    }

    #[test]
    fn test_integer_out_of_range_is_not_clamped() {
        let locale = LocaleConventions::default();
        assert_eq!(integer("9223372036854775807", &locale), "9223372036854775807");
        assert_eq!(integer("9223372036854775808", &locale), "9223372036854775808");
    }

    #[test]
    fn test_date_rerenders_with_declared_pattern() {
        let locale = brazilian();
        let date = |v: &str| format_value(&Value::from(v), Some(ColumnType::Date), &locale);
        assert_eq!(date("15/03/2024"), "15/03/2024");
        assert_eq!(date("2024-03-15"), "15/03/2024");
        assert_eq!(date("not a date"), "");
        assert_eq!(format_value(&Value::Null, Some(ColumnType::Date), &locale), "");
    }

    #[test]
    fn test_untyped_and_alphabetic_pass_through() {
        let locale = brazilian();
        assert_eq!(format_value(&Value::from(" Ana "), None, &locale), " Ana ");
        assert_eq!(format_value(&Value::from("1.234,50"), None, &locale), "1.234,50");
        assert_eq!(
            format_value(&Value::from("x"), Some(ColumnType::Alphabetic), &locale),
            "x"
        );
        assert_eq!(format_value(&Value::Null, Some(ColumnType::Alphabetic), &locale), "");
    }

    fn locales() -> impl Strategy<Value = LocaleConventions> {
        prop_oneof![
            Just(LocaleConventions::default()),
            Just(brazilian()),
            Just(LocaleConventions {
                decimal_separator: '.',
                thousands_separator: Some(','),
                date_format: "%m/%d/%Y".to_string(),
            }),
        ]
    }

    fn values() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i32>().prop_map(|v| Value::Integer(i64::from(v))),
            (-1.0e9f64..1.0e9).prop_map(Value::Float),
            "[0-9.,]{0,8}".prop_map(Value::Text),
            "[ a-zA-Z]{0,12}".prop_map(Value::Text),
            (1990i32..2040, 1u32..13, 1u32..29)
                .prop_map(|(y, m, d)| Value::Text(format!("{y:04}-{m:02}-{d:02}"))),
        ]
    }

    proptest! {
        #[test]
        fn formatting_is_idempotent(
            value in values(),
            locale in locales(),
            column_type in prop::sample::select(ColumnType::ALL.to_vec()),
        ) {
            let once = format_value(&value, Some(column_type), &locale);
            let twice = format_value(&Value::Text(once.clone()), Some(column_type), &locale);
            prop_assert_eq!(once, twice);
        }
    }
}
