//! Locale-aware numeric parsing and fixed-point rendering.

/// Removes the thousands separator and maps the decimal separator to `.`.
fn normalize_number(value: &str, decimal: char, thousands: Option<char>) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut cleaned = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        if Some(ch) == thousands {
            continue;
        }
        if ch == decimal {
            cleaned.push('.');
        } else {
            cleaned.push(ch);
        }
    }
    Some(cleaned)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Parses a real number using the declared decimal and thousands separators.
///
/// Returns `None` for blank, unparseable, or non-finite values (`NaN`, `inf`).
pub fn parse_locale_number(value: &str, decimal: char, thousands: Option<char>) -> Option<f64> {
    let cleaned = normalize_number(value, decimal, thousands)?;
    cleaned.parse::<f64>().ok().and_then(finite)
}

/// Parses a whole number using the declared separators.
///
/// Decimal values with a zero fractional part (`3.0`, `3,00`) are accepted.
pub fn parse_locale_integer(value: &str, decimal: char, thousands: Option<char>) -> Option<i64> {
    let cleaned = normalize_number(value, decimal, thousands)?;
    if let Ok(parsed) = cleaned.parse::<i64>() {
        return Some(parsed);
    }
    let parsed = cleaned.parse::<f64>().ok().and_then(finite)?;
    integral_to_i64(parsed)
}

/// Parses a number tolerating either `.` or `,` as the decimal mark.
///
/// The declared thousands separator is stripped first, then any remaining
/// comma is read as the decimal mark.
pub fn parse_tolerant_number(value: &str, thousands: Option<char>) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|ch| Some(*ch) != thousands)
        .map(|ch| if ch == ',' { '.' } else { ch })
        .collect();
    cleaned.parse::<f64>().ok().and_then(finite)
}

/// Converts a float to `i64` when it has no fractional part and fits.
///
/// `i64::MAX as f64` rounds up to 2^63, which is already out of range.
pub(crate) fn integral_to_i64(value: f64) -> Option<i64> {
    if value.fract() != 0.0 || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// Renders an integral float without a fractional suffix (`3.0` -> `3`).
///
/// Returns `None` when the value has a non-zero fraction.
pub fn format_integral(value: f64) -> Option<String> {
    integral_to_i64(value).map(|v| v.to_string())
}

/// Renders a number with exactly `decimals` fractional digits, no grouping.
pub fn format_fixed(value: f64, decimals: usize, decimal_separator: char) -> String {
    let rendered = format!("{value:.decimals$}");
    if decimal_separator == '.' {
        rendered
    } else {
        rendered.replace('.', &decimal_separator.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_locale_number_with_grouping() {
        assert_eq!(parse_locale_number("1.234,50", ',', Some('.')), Some(1234.5));
        assert_eq!(parse_locale_number("1,234.50", '.', Some(',')), Some(1234.5));
        assert_eq!(parse_locale_number("  42  ", '.', None), Some(42.0));
    }

    #[test]
    fn test_locale_number_rejects_garbage() {
        assert_eq!(parse_locale_number("", '.', None), None);
        assert_eq!(parse_locale_number("abc", '.', None), None);
        assert_eq!(parse_locale_number("NaN", '.', None), None);
        assert_eq!(parse_locale_number("inf", '.', None), None);
        assert_eq!(parse_locale_number("1.2.3", '.', None), None);
    }

    #[test]
    fn test_locale_integer() {
        assert_eq!(parse_locale_integer("42", '.', None), Some(42));
        assert_eq!(parse_locale_integer("-7", '.', None), Some(-7));
        assert_eq!(parse_locale_integer("3.0", '.', None), Some(3));
        assert_eq!(parse_locale_integer("3,00", ',', Some('.')), Some(3));
        assert_eq!(parse_locale_integer("1.000", ',', Some('.')), Some(1000));
        assert_eq!(parse_locale_integer("3.5", '.', None), None);
        assert_eq!(parse_locale_integer("x", '.', None), None);
    }

    #[test]
    fn test_tolerant_number() {
        assert_eq!(parse_tolerant_number("1.234,50", Some('.')), Some(1234.5));
        assert_eq!(parse_tolerant_number("12,5", None), Some(12.5));
        assert_eq!(parse_tolerant_number("12.5", None), Some(12.5));
        assert_eq!(parse_tolerant_number("n/a", None), None);
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(1234.5, 2, ','), "1234,50");
        assert_eq!(format_fixed(0.0, 2, '.'), "0.00");
        assert_eq!(format_fixed(166.9, 2, '.'), "166.90");
    }

    #[test]
    fn test_format_integral() {
        assert_eq!(format_integral(3.0), Some("3".to_string()));
        assert_eq!(format_integral(-12.0), Some("-12".to_string()));
        assert_eq!(format_integral(3.5), None);
    }

    #[test]
    fn test_integer_range_boundary() {
        assert_eq!(parse_locale_integer("9223372036854775807", '.', None), Some(i64::MAX));
        assert_eq!(parse_locale_integer("9223372036854775808", '.', None), None);
        assert_eq!(parse_locale_integer("9223372036854775808.0", '.', None), None);
        assert_eq!(parse_locale_integer("-9223372036854775808", '.', None), Some(i64::MIN));
        assert_eq!(format_integral(9_223_372_036_854_775_808.0), None);
        assert_eq!(format_integral(-9_223_372_036_854_775_808.0), Some(i64::MIN.to_string()));
    }

    proptest! {
        #[test]
        fn fixed_rendering_reparses(cents in -10_000_000i64..10_000_000i64) {
            let value = cents as f64 / 100.0;
            let rendered = format_fixed(value, 2, ',');
            let reparsed = parse_tolerant_number(&rendered, Some('.')).unwrap();
            prop_assert_eq!(format_fixed(reparsed, 2, ','), rendered);
        }
    }
}
