//! Domain types for nokia-t9.
//!
//! Key symbols, input purposes and output formats. Pure data.

use serde::{Deserialize, Serialize};

// ============================================================================
// KEY SYMBOLS
// ============================================================================

/// A physical keypad key.
///
/// Closed set: the twelve keys of a phone keypad. Layout order matches
/// the 4×3 DTMF grid (row-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Key {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Star,
    Zero,
    Hash,
}

impl Key {
    /// All keys in keypad order (row by row, left to right).
    pub const ALL: [Key; 12] = [
        Key::One,
        Key::Two,
        Key::Three,
        Key::Four,
        Key::Five,
        Key::Six,
        Key::Seven,
        Key::Eight,
        Key::Nine,
        Key::Star,
        Key::Zero,
        Key::Hash,
    ];

    /// Keys that cycle through candidates. Everything except `#`.
    pub const CYCLING: [Key; 11] = [
        Key::One,
        Key::Two,
        Key::Three,
        Key::Four,
        Key::Five,
        Key::Six,
        Key::Seven,
        Key::Eight,
        Key::Nine,
        Key::Star,
        Key::Zero,
    ];

    /// Parse a key from its printed symbol.
    pub fn from_char(c: char) -> Option<Key> {
        match c {
            '1' => Some(Key::One),
            '2' => Some(Key::Two),
            '3' => Some(Key::Three),
            '4' => Some(Key::Four),
            '5' => Some(Key::Five),
            '6' => Some(Key::Six),
            '7' => Some(Key::Seven),
            '8' => Some(Key::Eight),
            '9' => Some(Key::Nine),
            '*' => Some(Key::Star),
            '0' => Some(Key::Zero),
            '#' => Some(Key::Hash),
            _ => None,
        }
    }

    /// The symbol printed on the key.
    pub fn as_char(self) -> char {
        match self {
            Key::One => '1',
            Key::Two => '2',
            Key::Three => '3',
            Key::Four => '4',
            Key::Five => '5',
            Key::Six => '6',
            Key::Seven => '7',
            Key::Eight => '8',
            Key::Nine => '9',
            Key::Star => '*',
            Key::Zero => '0',
            Key::Hash => '#',
        }
    }

    /// Whether this is the case-toggle key.
    pub fn is_case_toggle(self) -> bool {
        self == Key::Hash
    }

    /// (row, column) position on the keypad grid.
    pub fn grid_position(self) -> (usize, usize) {
        let index = Key::ALL
            .iter()
            .position(|&k| k == self)
            .unwrap_or_default();
        (index / 3, index % 3)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl From<Key> for char {
    fn from(key: Key) -> char {
        key.as_char()
    }
}

impl TryFrom<char> for Key {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Key::from_char(c).ok_or_else(|| format!("Not a keypad key: {:?}", c))
    }
}

// ============================================================================
// CONFIGURATION ENUMS
// ============================================================================

/// What the composed text is for.
///
/// `Email` adds a validity indicator to the LCD header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Free-form SMS text.
    #[default]
    Message,
    /// An e-mail address.
    Email,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable pretty output.
    #[default]
    Human,
    /// Machine-readable JSON.
    Json,
}

// ============================================================================
// TESTS
// ============================================================================
