//! Date parsing under declared strftime-style patterns.
//!
//! Validation parses strictly under the schema's pattern. Formatting parses
//! tolerantly (declared pattern first, then a list of common layouts) and
//! re-renders with the declared pattern.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Returns true when every item of the pattern is understood by chrono.
pub fn is_valid_pattern(pattern: &str) -> bool {
    !pattern.trim().is_empty()
        && StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

fn has_day_specifier(pattern: &str) -> bool {
    ["%d", "%e", "%j", "%F", "%D", "%x", "%c", "%+", "%s"]
        .iter()
        .any(|spec| pattern.contains(spec))
}

/// Parses a value under an explicit pattern.
///
/// Date-time patterns and date-only patterns are both supported. Patterns
/// without a day component (`%Y-%m`) resolve to the first day of the month.
pub fn parse_with_pattern(value: &str, pattern: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if !has_day_specifier(pattern) {
        let padded = format!("{trimmed} 01");
        let padded_pattern = format!("{pattern} %d");
        if let Ok(date) = NaiveDate::parse_from_str(&padded, &padded_pattern) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%d/%m/%Y %H:%M:%S", // European
        "%d/%m/%Y %H:%M",
        "%m/%d/%Y %H:%M:%S", // US
        "%m/%d/%Y %H:%M",
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y", // US first for ambiguous slashes
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%d-%b-%Y", // 15-Jan-2024
        "%b %d, %Y",
        "%d %b %Y",
        "%Y%m%d",
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parses a value leniently.
///
/// The preferred pattern (usually the schema's) wins; otherwise common ISO,
/// European and US layouts are tried in order.
pub fn parse_tolerant(value: &str, preferred: Option<&str>) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(dt) = preferred.and_then(|pattern| parse_with_pattern(trimmed, pattern)) {
        return Some(dt);
    }
    try_parse_datetime(trimmed)
        .or_else(|| try_parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Renders a date-time with the pattern; `None` if the pattern cannot render it.
pub fn format_with_pattern(value: &NaiveDateTime, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", value.format(pattern)).ok()?;
    Some(out)
}
