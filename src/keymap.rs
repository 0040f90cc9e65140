//! Key maps: which characters each keypad key cycles through.
//!
//! A `KeyMap` is validated exhaustively when it is built. Once it exists,
//! every cycling key has a non-empty, ordered candidate list, so the
//! composer never has to handle a missing entry at runtime.
//!
//! The `#` key is reserved for case toggling and never appears in a map.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::Key;

// ============================================================================
// PRESETS
// ============================================================================

/// Built-in key map layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Nokia 3310 layout: letters, then the digit, punctuation on 1 and *.
    #[default]
    Nokia,
    /// Letters only. Digits are not cycle candidates.
    Letters,
    /// Trimmed for typing e-mail addresses.
    Email,
}

impl Preset {
    /// Candidate strings for each cycling key, in keypad order.
    fn table(self) -> [(Key, &'static str); 11] {
        match self {
            Preset::Nokia => [
                (Key::One, ".,?!1-@_+()"),
                (Key::Two, "abc2"),
                (Key::Three, "def3"),
                (Key::Four, "ghi4"),
                (Key::Five, "jkl5"),
                (Key::Six, "mno6"),
                (Key::Seven, "pqrs7"),
                (Key::Eight, "tuv8"),
                (Key::Nine, "wxyz9"),
                (Key::Star, "*+/=<>$%&\"'"),
                (Key::Zero, " 0"),
            ],
            Preset::Letters => [
                (Key::One, ".,?!-@_+()"),
                (Key::Two, "abc"),
                (Key::Three, "def"),
                (Key::Four, "ghi"),
                (Key::Five, "jkl"),
                (Key::Six, "mno"),
                (Key::Seven, "pqrs"),
                (Key::Eight, "tuv"),
                (Key::Nine, "wxyz"),
                (Key::Star, "*+/=<>$%&\"'"),
                (Key::Zero, " "),
            ],
            Preset::Email => [
                (Key::One, "1@."),
                (Key::Two, "abc2"),
                (Key::Three, "def3"),
                (Key::Four, "ghi4"),
                (Key::Five, "jkl5"),
                (Key::Six, "mno6"),
                (Key::Seven, "pqrs7"),
                (Key::Eight, "tuv8"),
                (Key::Nine, "wxyz9"),
                (Key::Star, "._-"),
                (Key::Zero, "0_-"),
            ],
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Preset::Nokia => "nokia",
            Preset::Letters => "letters",
            Preset::Email => "email",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// A key map that cannot drive the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMapError {
    /// A cycling key has no entry.
    MissingKey(Key),
    /// A key has an entry with no candidates.
    EmptyCandidates(Key),
    /// `#` is the case-toggle key and cannot be remapped.
    ReservedKey(Key),
    /// An entry name is not a keypad symbol.
    UnknownKey(String),
}

impl std::fmt::Display for KeyMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMapError::MissingKey(key) => write!(f, "Key map has no entry for key '{}'", key),
            KeyMapError::EmptyCandidates(key) => {
                write!(f, "Key '{}' has no candidate characters", key)
            }
            KeyMapError::ReservedKey(key) => {
                write!(f, "Key '{}' is reserved for case toggling", key)
            }
            KeyMapError::UnknownKey(name) => write!(f, "Not a keypad key: {:?}", name),
        }
    }
}

impl std::error::Error for KeyMapError {}

// ============================================================================
// KEY MAP
// ============================================================================

/// Validated table from cycling key to ordered candidate characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    entries: BTreeMap<Key, Vec<char>>,
}

impl KeyMap {
    /// Build a key map, checking coverage of every cycling key.
    ///
    /// # Errors
    /// Fails on a missing cycling key, an empty candidate list, or an
    /// entry for the reserved `#` key.
    pub fn new(entries: BTreeMap<Key, Vec<char>>) -> Result<Self, KeyMapError> {
        if entries.contains_key(&Key::Hash) {
            return Err(KeyMapError::ReservedKey(Key::Hash));
        }
        for key in Key::CYCLING {
            match entries.get(&key) {
                None => return Err(KeyMapError::MissingKey(key)),
                Some(candidates) if candidates.is_empty() => {
                    return Err(KeyMapError::EmptyCandidates(key));
                }
                Some(_) => {}
            }
        }
        Ok(KeyMap { entries })
    }

    /// Build a key map from one of the built-in layouts.
    pub fn preset(preset: Preset) -> Self {
        let entries = preset
            .table()
            .into_iter()
            .map(|(key, chars)| (key, chars.chars().collect()))
            .collect();
        KeyMap { entries }
    }

    /// Build a key map from symbol → candidate-string pairs, as found in
    /// a config file (`"2" = "abc2"`).
    ///
    /// # Errors
    /// Fails on names that are not single keypad symbols, plus everything
    /// [`KeyMap::new`] rejects.
    pub fn from_strings(table: &HashMap<String, String>) -> Result<Self, KeyMapError> {
        let mut entries = BTreeMap::new();
        for (name, candidates) in table {
            let mut chars = name.chars();
            let key = match (chars.next(), chars.next()) {
                (Some(c), None) => Key::from_char(c),
                _ => None,
            }
            .ok_or_else(|| KeyMapError::UnknownKey(name.clone()))?;
            entries.insert(key, candidates.chars().collect());
        }
        KeyMap::new(entries)
    }

    /// Convert back to the symbol → candidate-string form.
    pub fn to_strings(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(key, chars)| (key.to_string(), chars.iter().collect()))
            .collect()
    }

    /// Candidates for a key, or None for `#`.
    pub fn candidates(&self, key: Key) -> Option<&[char]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// The candidate at a cycle position.
    pub fn candidate(&self, key: Key, index: usize) -> Option<char> {
        self.candidates(key).and_then(|c| c.get(index).copied())
    }

    /// Number of candidates a key cycles through (0 for `#`).
    pub fn cycle_len(&self, key: Key) -> usize {
        self.candidates(key).map_or(0, <[char]>::len)
    }

    /// Entries in keypad order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &[char])> {
        Key::CYCLING
            .into_iter()
            .filter_map(|key| self.candidates(key).map(|c| (key, c)))
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        KeyMap::preset(Preset::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
