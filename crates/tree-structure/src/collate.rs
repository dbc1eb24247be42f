//! Locale-aware ordering of display names

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compare two display names the way a user expects them listed
///
/// Letters compare without regard to accents or case first, then accents,
/// then case (lowercase before uppercase), and finally raw code points so the
/// order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| case_pattern(a).cmp(case_pattern(b)))
        .then_with(|| a.cmp(b))
}

/// Compare optional names; a missing name sorts as the empty string
pub fn compare_optional_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    compare_names(a.unwrap_or(""), b.unwrap_or(""))
}

fn base_letters(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn case_pattern(name: &str) -> impl Iterator<Item = bool> + '_ {
    name.chars().map(char::is_uppercase)
}
