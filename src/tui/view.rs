//! Pure rendering: map App state to ratatui widget trees.
//!
//! The phone is drawn as a fixed-width handset centered in the terminal:
//! shell with the brand on top, LCD, a status line for tone and vibration,
//! then the 4×3 keypad. A help line sits at the bottom of the terminal.
//! Rendering reads the app only; the single effect is
//! `Frame::render_widget()`.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

use crate::keymap::KeyMap;
use crate::text::is_valid_email;
use crate::types::{Key, Purpose};

use super::state::{App, Screen};
use super::theme;

/// Handset width including the shell border.
const PHONE_WIDTH: u16 = 32;

/// LCD height including its border.
const LCD_HEIGHT: u16 = 7;

/// Candidate preview length under each key symbol.
const PREVIEW_CHARS: usize = 7;

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the phone to the terminal frame.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Min(0),    // phone
        Constraint::Length(1), // help
    ])
    .split(area);

    let [phone] = Layout::horizontal([Constraint::Length(PHONE_WIDTH)])
        .flex(Flex::Center)
        .areas(chunks[0]);

    render_phone(app, frame, phone);
    frame.render_widget(render_help(app.screen), chunks[1]);
}

// ============================================================================
// HANDSET
// ============================================================================

fn render_phone(app: &App, frame: &mut Frame, area: Rect) {
    let shell = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(theme::STYLE_SHELL)
        .title(Line::styled(" NOKIA ", theme::STYLE_BRAND).centered());
    let inner = shell.inner(area);
    frame.render_widget(shell, area);

    let chunks = Layout::vertical([
        Constraint::Length(LCD_HEIGHT), // screen
        Constraint::Length(1),          // status
        Constraint::Min(0),             // keypad
    ])
    .split(inner);

    render_lcd(app, frame, chunks[0]);
    frame.render_widget(render_status(app), chunks[1]);
    render_keypad(app.composer.keymap(), app.composer.active_key(), frame, chunks[2]);
}

/// Tone and vibration indicators between the screen and the keypad.
fn render_status(app: &App) -> Paragraph<'static> {
    let mut spans = Vec::new();
    if app.is_buzzing() {
        spans.push(Span::styled("~BZZ~ ", theme::STYLE_BUZZ));
    }
    if let Some(tone) = app.last_tone {
        spans.push(Span::styled(format!("♪ {}", tone), theme::STYLE_HELP));
    }
    Paragraph::new(Line::from(spans).centered())
}

// ============================================================================
// LCD
// ============================================================================

fn render_lcd(app: &App, frame: &mut Frame, area: Rect) {
    let lcd = Block::bordered().border_style(theme::STYLE_LCD);
    let inner = lcd.inner(area);
    frame.render_widget(lcd, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Min(0),    // body
        Constraint::Length(1), // soft key labels
    ])
    .split(inner);

    match app.screen {
        Screen::Menu => {
            let body = vec![
                Line::from(""),
                Line::styled("NOKIA", theme::STYLE_LCD_HEADER).centered(),
            ];
            frame.render_widget(Paragraph::new(body), chunks[1]);
            frame.render_widget(soft_keys("", "Menu", ""), chunks[2]);
        }
        Screen::Editor => {
            frame.render_widget(editor_header(app), chunks[0]);
            frame.render_widget(editor_paragraph(app, chunks[1]), chunks[1]);
            frame.render_widget(soft_keys("Del", "Ring", "Back"), chunks[2]);
        }
    }
}

/// The message body, scrolled so its last line (and the cursor) shows.
fn editor_paragraph(app: &App, area: Rect) -> Paragraph<'static> {
    let paragraph = Paragraph::new(editor_body(app)).wrap(Wrap { trim: false });
    let lines = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
    paragraph.scroll((lines.saturating_sub(area.height), 0))
}

/// "New message", plus a validity marker when typing an address.
fn editor_header(app: &App) -> Line<'static> {
    let mut spans = vec![Span::styled("New message", theme::STYLE_LCD_HEADER)];
    if app.purpose == Purpose::Email {
        let (mark, style) = if is_valid_email(app.composer.text()) {
            (" ✓", theme::STYLE_VALID)
        } else {
            (" ✗", theme::STYLE_INVALID)
        };
        spans.push(Span::styled(mark, style));
    }
    Line::from(spans)
}

/// Composed text with the cycling character underlined and the cursor.
///
/// Blinking `_` on an empty buffer, blinking `|` while a key cycles.
fn editor_body(app: &App) -> Line<'static> {
    let text = app.composer.text();
    let cycling = app.composer.active_key().is_some();

    let mut spans = Vec::new();
    match (cycling, text.char_indices().last()) {
        (true, Some((split, last))) => {
            spans.push(Span::styled(text[..split].to_string(), theme::STYLE_LCD));
            spans.push(Span::styled(last.to_string(), theme::STYLE_LCD_CYCLING));
        }
        _ => spans.push(Span::styled(text.to_string(), theme::STYLE_LCD)),
    }

    let cursor = if cycling {
        Some("|")
    } else if text.is_empty() {
        Some("_")
    } else {
        None
    };
    if let Some(cursor) = cursor.filter(|_| app.cursor_on) {
        spans.push(Span::styled(cursor, theme::STYLE_LCD));
    }

    Line::from(spans)
}

/// Left, center and right soft key labels on the bottom LCD row.
fn soft_keys(left: &'static str, center: &'static str, right: &'static str) -> Paragraph<'static> {
    let [l, c, r] = [left, center, right].map(|label| Span::styled(label, theme::STYLE_LCD));
    let width = PHONE_WIDTH as usize - 6;
    let gap = width.saturating_sub(left.len() + center.len() + right.len());
    let left_gap = gap / 2;
    Paragraph::new(Line::from(vec![
        l,
        Span::raw(" ".repeat(left_gap)),
        c,
        Span::raw(" ".repeat(gap - left_gap)),
        r,
    ]))
}

// ============================================================================
// KEYPAD
// ============================================================================

fn render_keypad(keymap: &KeyMap, active: Option<Key>, frame: &mut Frame, area: Rect) {
    let rows = Layout::vertical([Constraint::Length(2); 4]).split(area);
    for (row_index, row) in Key::ALL.chunks(3).enumerate() {
        let cells = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(rows[row_index]);
        for (col, key) in row.iter().enumerate() {
            frame.render_widget(key_button(keymap, *key, active == Some(*key)), cells[col]);
        }
    }
}

fn key_button(keymap: &KeyMap, key: Key, active: bool) -> Paragraph<'static> {
    let symbol_style = if active {
        theme::STYLE_KEY_ACTIVE
    } else {
        theme::STYLE_KEY
    };
    let letters = match keymap.candidates(key) {
        Some(chars) => preview(chars),
        None => "aA".to_string(),
    };
    Paragraph::new(vec![
        Line::styled(format!(" {} ", key), symbol_style).centered(),
        Line::styled(letters, theme::STYLE_KEY_LETTERS).centered(),
    ])
}

/// Short candidate list; spaces shown as `␣`, long lists end in `…`.
fn preview(chars: &[char]) -> String {
    let shown = chars
        .iter()
        .take(PREVIEW_CHARS)
        .map(|&c| if c == ' ' { '␣' } else { c });
    let mut out: String = shown.collect();
    if chars.len() > PREVIEW_CHARS {
        out.pop();
        out.push('…');
    }
    out
}

// ============================================================================
// HELP
// ============================================================================

/// Help line showing available keybindings for the current screen.
fn render_help(screen: Screen) -> Paragraph<'static> {
    let help_text = match screen {
        Screen::Menu => "[0-9*#/Enter] open  [q] quit",
        Screen::Editor => {
            "[0-9*#] type  [Bksp] del  [Enter] ring  [Del] clear  [Esc] back  [q] quit"
        }
    };
    Paragraph::new(Span::styled(help_text, theme::STYLE_HELP))
}

// ============================================================================
// TESTS
// ============================================================================
