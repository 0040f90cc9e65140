//! TUI effects boundary: event loop, terminal lifecycle, key mapping.
//!
//! This is the only module with side effects. It wires the pure layers
//! (state, update, view) to the real terminal via crossterm and ratatui,
//! and hands feedback requests to the tone and haptics collaborators.
//!
//! A key reader thread feeds an mpsc channel. The loop waits on it with a
//! timeout bounded by the next commit deadline, cursor blink or end of
//! vibration, so the commit timer fires on the thread that owns the
//! composer.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info};

use crate::composer::Composer;
use crate::feedback::{BellTonePlayer, LoggingHaptics, SilentTonePlayer, TonePlayer, deliver};
use crate::types::{Key, Purpose};

use super::state::{Action, App, AppEvent};
use super::update::{apply, next_wakeup, tick, update};
use super::view::render;

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Map a crossterm key event to a phone button.
///
/// Returns None for keys that don't map to any button, and for key
/// releases and repeats on terminals that report them.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char(c) if Key::from_char(c).is_some() => Key::from_char(c).map(Action::Key),
        KeyCode::Backspace | KeyCode::Left => Some(Action::SoftLeft),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Center),
        KeyCode::Esc | KeyCode::Right => Some(Action::SoftRight),
        KeyCode::Delete => Some(Action::Clear),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

// ============================================================================
// KEY READER
// ============================================================================

/// Spawn a thread that reads crossterm events and forwards key events to the channel.
fn spawn_key_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break; // receiver dropped, TUI is shutting down
                    }
                }
                Ok(_) => {} // ignore mouse, resize, etc.
                Err(e) => {
                    debug!(error = %e, "key reader stopped");
                    let _ = tx.send(AppEvent::InputClosed);
                    break;
                }
            }
        }
    });
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the phone until the user quits.
///
/// `mute` swaps the terminal bell for silence. Vibration is always
/// written to the log, since terminals have no motor.
pub fn run(composer: Composer, purpose: Purpose, mute: bool) -> io::Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let mut app = App::new(composer, purpose, Instant::now());

    let mut player: Box<dyn TonePlayer> = if mute {
        Box::new(SilentTonePlayer)
    } else {
        Box::new(BellTonePlayer::new(io::stdout()))
    };
    let mut haptics = LoggingHaptics;

    let (tx, rx) = mpsc::channel::<AppEvent>();
    spawn_key_reader(tx);
    info!(?purpose, mute, "phone started");

    let result = loop {
        tick(&mut app, Instant::now());

        if let Err(e) = terminal.draw(|frame| render(&app, frame)) {
            break Err(e);
        }

        if app.should_quit {
            break Ok(());
        }

        let wait = next_wakeup(&app, Instant::now());
        match rx.recv_timeout(wait) {
            Ok(AppEvent::Key(key)) => {
                if let Some(action) = map_key(key) {
                    let now = Instant::now();
                    // A deadline that passed while blocked commits first
                    tick(&mut app, now);
                    let transition = update(app.screen, &action);
                    let feedback = apply(&mut app, transition, now);
                    deliver(&feedback, player.as_mut(), &mut haptics);
                }
            }
            Ok(AppEvent::InputClosed) => break Ok(()),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break Ok(()),
        }
    };

    app.composer.teardown();
    info!(chars = app.composer.text().chars().count(), "phone stopped");
    restore_terminal()?;
    result
}

// ============================================================================
// TESTS
// ============================================================================
