//! Locale conventions declared by an input schema.

use chrono::NaiveDateTime;

use crate::datetime::{parse_tolerant, parse_with_pattern};
use crate::numeric::{parse_locale_integer, parse_locale_number, parse_tolerant_number};

/// Default date pattern when none is declared.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Decimal separator, thousands separator and date pattern of one input.
///
/// These are the source of truth for how a column's text is interpreted on
/// input and re-rendered on output. Derived columns inherit the conventions of
/// the input they were copied or computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConventions {
    pub decimal_separator: char,
    pub thousands_separator: Option<char>,
    pub date_format: String,
}

impl Default for LocaleConventions {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            thousands_separator: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl LocaleConventions {
    /// Strict number parse honoring both declared separators.
    pub fn parse_number(&self, value: &str) -> Option<f64> {
        parse_locale_number(value, self.decimal_separator, self.thousands_separator)
    }

    /// Strict whole-number parse; integral decimals such as `3,00` are accepted.
    pub fn parse_integer(&self, value: &str) -> Option<i64> {
        parse_locale_integer(value, self.decimal_separator, self.thousands_separator)
    }

    /// Lenient number parse used when re-rendering already validated values.
    pub fn parse_number_tolerant(&self, value: &str) -> Option<f64> {
        parse_tolerant_number(value, self.thousands_separator)
    }

    /// Strict date parse under the declared pattern.
    pub fn parse_date(&self, value: &str) -> Option<NaiveDateTime> {
        parse_with_pattern(value, &self.date_format)
    }

    /// Lenient date parse: declared pattern first, then common layouts.
    pub fn parse_date_tolerant(&self, value: &str) -> Option<NaiveDateTime> {
        parse_tolerant(value, Some(&self.date_format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brazilian() -> LocaleConventions {
        LocaleConventions {
            decimal_separator: ',',
            thousands_separator: Some('.'),
            date_format: "%d/%m/%Y".to_string(),
        }
    }

    #[test]
    fn parses_with_declared_separators() {
        let locale = brazilian();
        assert_eq!(locale.parse_number("1.234,50"), Some(1234.5));
        assert_eq!(locale.parse_integer("1.000"), Some(1000));
        assert!(locale.parse_date("25/12/2023").is_some());
        assert!(locale.parse_date("2023-12-25").is_none());
    }

    #[test]
    fn tolerant_date_falls_back_to_iso() {
        let locale = brazilian();
        assert!(locale.parse_date_tolerant("2023-12-25").is_some());
    }
}
