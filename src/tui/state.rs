//! TUI state algebra: the phone's screens, actions and transitions.
//!
//! The composer lives in [`App`]; screens carry no data of their own.
//! Navigation is decided purely from (Screen, Action) in `update`, and
//! what a transition does to the composer is spelled out as [`Effect`]s
//! so it can be checked without a terminal.

use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;

use crate::composer::Composer;
use crate::feedback::Tone;
use crate::types::{Key, Purpose};

/// Cursor blink half-period.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);

// ============================================================================
// APP EVENTS
// ============================================================================

/// Everything the event loop can receive from its channel.
#[derive(Debug)]
pub enum AppEvent {
    /// A terminal key event from the crossterm reader thread.
    Key(KeyEvent),
    /// The reader thread stopped (terminal gone or read error).
    InputClosed,
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Top-level TUI model.
#[derive(Debug)]
pub struct App {
    /// Current screen.
    pub screen: Screen,

    /// Text entry state machine.
    pub composer: Composer,

    /// What the user is typing; `Email` adds a validity marker.
    pub purpose: Purpose,

    /// Most recent tone, shown as its DTMF pair on the phone body.
    pub last_tone: Option<Tone>,

    /// End of the vibration in progress, if any.
    pub buzz_until: Option<Instant>,

    /// Blink phase of the LCD cursor.
    pub cursor_on: bool,

    /// Reference point for the blink phase.
    pub started: Instant,

    /// Set to true when the app should exit on the next tick.
    pub should_quit: bool,
}

impl App {
    /// A phone showing its menu, nothing typed yet.
    pub fn new(composer: Composer, purpose: Purpose, now: Instant) -> Self {
        App {
            screen: Screen::Menu,
            composer,
            purpose,
            last_tone: None,
            buzz_until: None,
            cursor_on: true,
            started: now,
            should_quit: false,
        }
    }

    /// Whether a vibration is in progress.
    pub fn is_buzzing(&self) -> bool {
        self.buzz_until.is_some()
    }
}

// ============================================================================
// SCREENS
// ============================================================================

/// What the LCD shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Idle screen: brand and "Menu" soft key label.
    #[default]
    Menu,
    /// Message editor.
    Editor,
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Semantic phone button press, decoupled from raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A keypad button `0-9 * #`.
    Key(Key),
    /// Left soft key (backspace in the editor).
    SoftLeft,
    /// Center navigation button.
    Center,
    /// Right soft key (back to menu).
    SoftRight,
    /// Erase everything typed.
    Clear,
    /// Quit the application.
    Quit,
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of a pure state transition.
///
/// Effects run in order, after the screen switch if there is one.
#[derive(Debug, PartialEq)]
pub enum Transition {
    /// Stay on the current screen.
    Stay(Vec<Effect>),
    /// Move to another screen.
    Screen(Screen, Vec<Effect>),
    /// Quit the application.
    Quit,
}

/// Work a transition asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Feed a keypad press to the composer.
    Press(Key),
    /// Composer backspace.
    Backspace,
    /// Composer clear.
    Clear,
    /// Key tone and pulse without composing anything.
    KeyTone(Key),
    /// Navigation button pulse.
    Pulse,
    /// Ringtone and the long vibration.
    Ring,
}

// ============================================================================
// TESTS
// ============================================================================
