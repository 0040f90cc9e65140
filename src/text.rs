//! Text helpers: case toggling and e-mail validity.
//!
//! Pure functions, no state.

use std::sync::LazyLock;

use regex::Regex;

/// Loose e-mail shape: something, `@`, something, `.`, something.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern compiles")
});

/// The opposite-case form of `c`.
///
/// A char counts as upper case when upper-casing leaves it unchanged and
/// lower-casing does not. Returns None for uncased chars (digits,
/// punctuation, spaces) and for chars whose case mapping is not a single
/// char (`ß` upper-cases to `SS`), so toggling twice always restores the
/// original.
pub fn toggle_case(c: char) -> Option<char> {
    let is_upper = c.to_uppercase().eq(std::iter::once(c))
        && !c.to_lowercase().eq(std::iter::once(c));

    let mut mapped = if is_upper {
        c.to_lowercase().collect::<Vec<_>>()
    } else {
        c.to_uppercase().collect::<Vec<_>>()
    };

    match (mapped.pop(), mapped.is_empty()) {
        (Some(m), true) if m != c => Some(m),
        _ => None,
    }
}

/// Whether `text` looks like an e-mail address.
pub fn is_valid_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

// ============================================================================
// TESTS
// ============================================================================
