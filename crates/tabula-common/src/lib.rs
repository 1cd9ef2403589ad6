//! Shared utilities for Tabula crates.
//!
//! Number and date parsing live here because both the validation engine and
//! the locale formatter must interpret cell text the same way. Name folding
//! is shared so that collision checks and lookups agree.

pub mod datetime;
pub mod locale;
pub mod numeric;
pub mod text;

pub use datetime::{format_with_pattern, is_valid_pattern, parse_tolerant, parse_with_pattern};
pub use locale::LocaleConventions;
pub use numeric::{
    format_fixed, format_integral, parse_locale_integer, parse_locale_number,
    parse_tolerant_number,
};
pub use text::{eq_fold, fold_case, fold_diacritics};
