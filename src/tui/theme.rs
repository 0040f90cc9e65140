//! Phone colors and style constants.
//!
//! Color semantics:
//! - Green on black: the LCD (text, cursor, header)
//! - Dark blue: the phone shell
//! - Cyan: keypad labels and keybinding hints
//! - Yellow: the buzz indicator and the highlighted cycling key
//! - Red: invalid e-mail marker

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// PHONE BODY
// ============================================================================

/// Outline of the handset.
pub const STYLE_SHELL: Style = Style::new().fg(Color::Blue);

/// "NOKIA" brand above the screen.
pub const STYLE_BRAND: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);

// ============================================================================
// LCD
// ============================================================================

/// Ordinary LCD text.
pub const STYLE_LCD: Style = Style::new().fg(Color::Green);

/// LCD header line.
pub const STYLE_LCD_HEADER: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);

/// The character still being cycled.
pub const STYLE_LCD_CYCLING: Style = Style::new()
    .fg(Color::Green)
    .add_modifier(Modifier::UNDERLINED);

/// E-mail address looks valid.
pub const STYLE_VALID: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);

/// E-mail address does not look valid.
pub const STYLE_INVALID: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);

// ============================================================================
// KEYPAD
// ============================================================================

/// Key symbol on a keypad button.
pub const STYLE_KEY: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

/// The key currently cycling.
pub const STYLE_KEY_ACTIVE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);

/// Candidate letters under a key symbol.
pub const STYLE_KEY_LETTERS: Style = Style::new().fg(Color::DarkGray);

/// Vibration in progress.
pub const STYLE_BUZZ: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

/// Footer / help line.
pub const STYLE_HELP: Style = Style::new().fg(Color::DarkGray);

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcd_is_green() {
        assert_eq!(STYLE_LCD.fg, Some(Color::Green));
        assert_eq!(STYLE_LCD_HEADER.fg, Some(Color::Green));
        assert_eq!(STYLE_VALID.fg, Some(Color::Green));
    }

    #[test]
    fn invalid_marker_is_red() {
        assert_eq!(STYLE_INVALID.fg, Some(Color::Red));
    }

    #[test]
    fn active_key_is_highlighted() {
        assert_eq!(STYLE_KEY_ACTIVE.bg, Some(Color::Yellow));
        assert!(STYLE_LCD_CYCLING.add_modifier.contains(Modifier::UNDERLINED));
    }
}
