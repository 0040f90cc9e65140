//! Report formatting for compositions and key maps.
//!
//! Pure functions: (data, OutputFormat) → String.
//! No I/O, no side effects.

use serde::Serialize;

use crate::feedback::Tone;
use crate::keymap::KeyMap;
use crate::replay::Composition;
use crate::text::is_valid_email;
use crate::types::{Key, OutputFormat, Purpose};

/// Format the result of a replayed script.
pub fn format_composition(
    composition: &Composition,
    purpose: Purpose,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Human => composition_human(composition, purpose),
        OutputFormat::Json => composition_json(composition, purpose),
    }
}

/// Format a key map as a keypad table.
pub fn format_keymap(keymap: &KeyMap, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => keymap_human(keymap),
        OutputFormat::Json => to_json(&keymap.to_strings()),
    }
}

// ============================================================================
// HUMAN FORMAT
// ============================================================================

fn composition_human(composition: &Composition, purpose: Purpose) -> String {
    let mut out = String::new();
    out.push_str(&composition.text);
    out.push('\n');

    out.push_str("\n=== Summary ===\n");
    out.push_str(&format!(
        "Characters:   {}\n",
        composition.text.chars().count()
    ));
    out.push_str(&format!("Key presses:  {}\n", composition.key_presses));
    out.push_str(&format!("Commits:      {}\n", composition.timeout_commits));
    if let Some(key) = composition.active_key {
        out.push_str(&format!("Cycling:      {}\n", key));
    }
    out.push_str(&format!("Elapsed:      {} ms\n", composition.elapsed_ms));
    if purpose == Purpose::Email {
        let verdict = if is_valid_email(&composition.text) {
            "valid"
        } else {
            "invalid"
        };
        out.push_str(&format!("E-mail:       {}\n", verdict));
    }

    out
}

fn keymap_human(keymap: &KeyMap) -> String {
    let mut out = String::new();
    for key in Key::ALL {
        let tone = Tone::Key(key);
        let candidates = match keymap.candidates(key) {
            Some(chars) => chars.iter().map(|c| display_char(*c)).collect::<Vec<_>>().join(" "),
            None => "(case toggle)".to_string(),
        };
        out.push_str(&format!("{}  {:<14}  {}\n", key, tone.to_string(), candidates));
    }
    out
}

/// Spaces are invisible in a list, so name them.
fn display_char(c: char) -> String {
    if c == ' ' {
        "␠".to_string()
    } else {
        c.to_string()
    }
}

// ============================================================================
// JSON FORMAT
// ============================================================================

#[derive(Serialize)]
struct CompositionJson<'a> {
    #[serde(flatten)]
    composition: &'a Composition,
    purpose: Purpose,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_email: Option<bool>,
}

fn composition_json(composition: &Composition, purpose: Purpose) -> String {
    let valid_email = (purpose == Purpose::Email).then(|| is_valid_email(&composition.text));
    to_json(&CompositionJson {
        composition,
        purpose,
        valid_email,
    })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        // Only maps with string keys and plain structs are serialized here
        panic!("Failed to serialize report to JSON: {}", e)
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Preset;

    fn sample() -> Composition {
        Composition {
            text: "hello".to_string(),
            active_key: Some(Key::Six),
            key_presses: 13,
            timeout_commits: 1,
            elapsed_ms: 1900,
        }
    }

    #[test]
    fn human_composition_starts_with_text() {
        let out = format_composition(&sample(), Purpose::Message, OutputFormat::Human);
        assert!(out.starts_with("hello\n"));
        assert!(out.contains("Key presses:  13"));
        assert!(out.contains("Cycling:      6"));
        assert!(!out.contains("E-mail"));
    }

    #[test]
    fn human_composition_idle_omits_cycling() {
        let composition = Composition {
            active_key: None,
            ..sample()
        };
        let out = format_composition(&composition, Purpose::Message, OutputFormat::Human);
        assert!(!out.contains("Cycling"));
    }

    #[test]
    fn human_composition_reports_email_validity() {
        let out = format_composition(&sample(), Purpose::Email, OutputFormat::Human);
        assert!(out.contains("E-mail:       invalid"));

        let composition = Composition {
            text: "a@b.c".to_string(),
            ..sample()
        };
        let out = format_composition(&composition, Purpose::Email, OutputFormat::Human);
        assert!(out.contains("E-mail:       valid"));
    }

    #[test]
    fn json_composition_has_expected_fields() {
        let out = format_composition(&sample(), Purpose::Message, OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["text"], "hello");
        assert_eq!(parsed["active_key"], "6");
        assert_eq!(parsed["key_presses"], 13);
        assert_eq!(parsed["elapsed_ms"], 1900);
        assert_eq!(parsed["purpose"], "message");
        assert!(parsed.get("valid_email").is_none());
    }

    #[test]
    fn json_composition_email_flag() {
        let out = format_composition(&sample(), Purpose::Email, OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["valid_email"], false);
    }

    #[test]
    fn human_keymap_lists_every_key() {
        let out = format_keymap(&KeyMap::default(), OutputFormat::Human);
        assert_eq!(out.lines().count(), 12);
        assert!(out.contains("2  697+1336 Hz     a b c 2"));
        assert!(out.contains("0  941+1336 Hz     ␠ 0"));
        assert!(out.contains("#  941+1477 Hz     (case toggle)"));
    }

    #[test]
    fn json_keymap_round_trips() {
        let out = format_keymap(&KeyMap::preset(Preset::Email), OutputFormat::Json);
        let table: std::collections::HashMap<String, String> =
            serde_json::from_str(&out).unwrap();
        assert_eq!(KeyMap::from_strings(&table).unwrap(), KeyMap::preset(Preset::Email));
    }
}
