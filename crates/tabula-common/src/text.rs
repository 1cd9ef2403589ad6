//! Text folding shared by name lookups and keyword matching.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

fn folded_chars(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().flat_map(char::to_lowercase)
}

/// Case-folded form of a name. Two names collide iff their folded forms are
/// equal, which is exactly when [`eq_fold`] holds.
pub fn fold_case(value: &str) -> String {
    folded_chars(value).collect()
}

/// Case-insensitive comparison using full Unicode lowercasing.
pub fn eq_fold(left: &str, right: &str) -> bool {
    folded_chars(left).eq(folded_chars(right))
}

/// Decomposes the text and drops combining marks, so `fácil` becomes `facil`.
pub fn fold_diacritics(value: &str) -> String {
    value.nfd().filter(|ch| !is_combining_mark(*ch)).collect()
}
