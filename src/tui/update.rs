//! State transitions: (Screen, Action) → Transition, then effects on App.
//!
//! `update` is pure and decides navigation. `apply` runs the resulting
//! effects against the composer with an explicit clock and collects the
//! feedback requests for the effects boundary. `tick` advances time:
//! commit deadlines, vibration expiry and cursor blink. Nothing here
//! touches the terminal.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::feedback::{Feedback, Tone, VibrationPattern};

use super::state::{Action, App, BLINK_INTERVAL, Effect, Screen, Transition};

/// Pure state transition function.
pub fn update(screen: Screen, action: &Action) -> Transition {
    if *action == Action::Quit {
        return Transition::Quit;
    }
    match screen {
        Screen::Menu => update_menu(action),
        Screen::Editor => update_editor(action),
    }
}

// ============================================================================
// PER-SCREEN HANDLERS
// ============================================================================

/// Menu: any keypad press or the center button opens the editor. The press
/// that opens it is not typed.
fn update_menu(action: &Action) -> Transition {
    match *action {
        Action::Key(key) => Transition::Screen(Screen::Editor, vec![Effect::KeyTone(key)]),
        Action::Center => Transition::Screen(Screen::Editor, vec![Effect::Pulse]),
        Action::SoftLeft | Action::SoftRight => Transition::Stay(vec![Effect::Pulse]),
        Action::Clear | Action::Quit => Transition::Stay(Vec::new()),
    }
}

/// Editor: keypad composes, soft keys edit and navigate, center rings.
fn update_editor(action: &Action) -> Transition {
    match *action {
        Action::Key(key) => Transition::Stay(vec![Effect::Press(key)]),
        Action::SoftLeft => Transition::Stay(vec![Effect::Backspace]),
        Action::Center => Transition::Stay(vec![Effect::Pulse, Effect::Ring]),
        Action::SoftRight => Transition::Screen(Screen::Menu, vec![Effect::Pulse, Effect::Clear]),
        Action::Clear => Transition::Stay(vec![Effect::Pulse, Effect::Clear]),
        Action::Quit => Transition::Quit,
    }
}

// ============================================================================
// APPLYING TRANSITIONS
// ============================================================================

/// Apply a transition to the app and return the feedback it requested.
///
/// The tone and vibration state shown on the phone body are updated from
/// the same feedback list, so the display always matches what was asked
/// of the collaborators.
pub fn apply(app: &mut App, transition: Transition, now: Instant) -> Vec<Feedback> {
    let effects = match transition {
        Transition::Quit => {
            app.should_quit = true;
            return Vec::new();
        }
        Transition::Stay(effects) => effects,
        Transition::Screen(screen, effects) => {
            debug!(from = ?app.screen, to = ?screen, "screen change");
            app.screen = screen;
            effects
        }
    };

    let mut feedback = Vec::new();
    for effect in effects {
        match effect {
            Effect::Press(key) => feedback.extend(app.composer.handle_key_press(key, now)),
            Effect::Backspace => feedback.extend(app.composer.handle_backspace()),
            Effect::Clear => app.composer.clear(),
            Effect::KeyTone(key) => feedback.extend(Feedback::keypad(key)),
            Effect::Pulse => feedback.extend(Feedback::navigation()),
            Effect::Ring => {
                feedback.push(Feedback::Tone(Tone::Ringtone));
                feedback.push(Feedback::Vibrate(VibrationPattern::ring()));
            }
        }
    }
    record(app, &feedback, now);
    feedback
}

/// Remember the last tone and extend the buzz window.
fn record(app: &mut App, feedback: &[Feedback], now: Instant) {
    for item in feedback {
        match item {
            Feedback::Tone(tone) => app.last_tone = Some(*tone),
            Feedback::Vibrate(pattern) => {
                let end = now + pattern.total();
                app.buzz_until = Some(app.buzz_until.map_or(end, |until| until.max(end)));
            }
        }
    }
}

// ============================================================================
// TIME
// ============================================================================

/// Advance the app to `now`. Returns true when anything visible changed.
pub fn tick(app: &mut App, now: Instant) -> bool {
    let mut changed = app.composer.poll_commit(now);

    if app.buzz_until.is_some_and(|until| now >= until) {
        app.buzz_until = None;
        changed = true;
    }

    let cursor_on = blink_phase(app.started, now);
    if cursor_on != app.cursor_on {
        app.cursor_on = cursor_on;
        changed = true;
    }

    changed
}

/// How long the event loop may sleep before something needs `tick`.
pub fn next_wakeup(app: &App, now: Instant) -> Duration {
    let elapsed = now.saturating_duration_since(app.started).as_millis();
    let period = BLINK_INTERVAL.as_millis();
    let to_blink = Duration::from_millis((period - elapsed % period) as u64);

    [
        Some(to_blink),
        app.composer.time_to_commit(now),
        app.buzz_until.map(|d| d.saturating_duration_since(now)),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(to_blink)
}

fn blink_phase(started: Instant, now: Instant) -> bool {
    let elapsed = now.saturating_duration_since(started).as_millis();
    (elapsed / BLINK_INTERVAL.as_millis()) % 2 == 0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{Composer, DEFAULT_COMMIT_TIMEOUT};
    use crate::feedback::{KEYPAD_PULSE, NAVIGATION_PULSE};
    use crate::keymap::KeyMap;
    use crate::types::{Key, Purpose};

    fn app_at(screen: Screen) -> (App, Instant) {
        let now = Instant::now();
        let composer = Composer::new(KeyMap::default(), DEFAULT_COMMIT_TIMEOUT);
        let mut app = App::new(composer, Purpose::Message, now);
        app.screen = screen;
        (app, now)
    }

    fn act(app: &mut App, action: Action, now: Instant) -> Vec<Feedback> {
        let transition = update(app.screen, &action);
        apply(app, transition, now)
    }

    // ------------------------------------------------------------------
    // Pure navigation
    // ------------------------------------------------------------------

    #[test]
    fn quit_from_any_screen() {
        assert_eq!(update(Screen::Menu, &Action::Quit), Transition::Quit);
        assert_eq!(update(Screen::Editor, &Action::Quit), Transition::Quit);
    }

    #[test]
    fn menu_keypad_opens_editor_without_typing() {
        assert_eq!(
            update(Screen::Menu, &Action::Key(Key::Two)),
            Transition::Screen(Screen::Editor, vec![Effect::KeyTone(Key::Two)])
        );
    }

    #[test]
    fn menu_center_opens_editor() {
        assert_eq!(
            update(Screen::Menu, &Action::Center),
            Transition::Screen(Screen::Editor, vec![Effect::Pulse])
        );
    }

    #[test]
    fn menu_clear_is_noop() {
        assert_eq!(update(Screen::Menu, &Action::Clear), Transition::Stay(Vec::new()));
    }

    #[test]
    fn editor_keypad_composes() {
        assert_eq!(
            update(Screen::Editor, &Action::Key(Key::Hash)),
            Transition::Stay(vec![Effect::Press(Key::Hash)])
        );
    }

    #[test]
    fn editor_soft_right_returns_to_menu_and_clears() {
        assert_eq!(
            update(Screen::Editor, &Action::SoftRight),
            Transition::Screen(Screen::Menu, vec![Effect::Pulse, Effect::Clear])
        );
    }

    #[test]
    fn editor_center_rings() {
        assert_eq!(
            update(Screen::Editor, &Action::Center),
            Transition::Stay(vec![Effect::Pulse, Effect::Ring])
        );
    }

    // ------------------------------------------------------------------
    // Applying effects
    // ------------------------------------------------------------------

    #[test]
    fn opening_editor_does_not_type() {
        let (mut app, now) = app_at(Screen::Menu);
        let feedback = act(&mut app, Action::Key(Key::Four), now);
        assert_eq!(app.screen, Screen::Editor);
        assert_eq!(app.composer.text(), "");
        assert_eq!(feedback, Feedback::keypad(Key::Four));
        assert_eq!(app.last_tone, Some(Tone::Key(Key::Four)));
    }

    #[test]
    fn typing_in_editor() {
        let (mut app, now) = app_at(Screen::Editor);
        act(&mut app, Action::Key(Key::Four), now);
        act(&mut app, Action::Key(Key::Four), now + Duration::from_millis(100));
        assert_eq!(app.composer.text(), "h");
        assert_eq!(app.composer.active_key(), Some(Key::Four));
    }

    #[test]
    fn soft_left_backspaces() {
        let (mut app, now) = app_at(Screen::Editor);
        act(&mut app, Action::Key(Key::Two), now);
        let feedback = act(&mut app, Action::SoftLeft, now);
        assert_eq!(app.composer.text(), "");
        assert_eq!(app.composer.active_key(), None);
        assert_eq!(feedback, Feedback::navigation());
    }

    #[test]
    fn back_to_menu_clears_buffer() {
        let (mut app, now) = app_at(Screen::Editor);
        act(&mut app, Action::Key(Key::Two), now);
        act(&mut app, Action::SoftRight, now);
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(app.composer.text(), "");
        assert_eq!(app.composer.next_deadline(), None);
    }

    #[test]
    fn ring_sets_long_buzz() {
        let (mut app, now) = app_at(Screen::Editor);
        let feedback = act(&mut app, Action::Center, now);
        assert_eq!(
            feedback,
            vec![
                Feedback::Vibrate(VibrationPattern::pulse(NAVIGATION_PULSE)),
                Feedback::Tone(Tone::Ringtone),
                Feedback::Vibrate(VibrationPattern::ring()),
            ]
        );
        assert_eq!(app.last_tone, Some(Tone::Ringtone));
        assert_eq!(app.buzz_until, Some(now + VibrationPattern::ring().total()));
    }

    #[test]
    fn short_pulse_does_not_shorten_ring() {
        let (mut app, now) = app_at(Screen::Editor);
        act(&mut app, Action::Center, now);
        act(&mut app, Action::Key(Key::Two), now + Duration::from_millis(10));
        assert_eq!(app.buzz_until, Some(now + VibrationPattern::ring().total()));
    }

    #[test]
    fn quit_sets_flag_without_feedback() {
        let (mut app, now) = app_at(Screen::Editor);
        assert!(act(&mut app, Action::Quit, now).is_empty());
        assert!(app.should_quit);
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    #[test]
    fn tick_commits_after_timeout() {
        let (mut app, now) = app_at(Screen::Editor);
        act(&mut app, Action::Key(Key::Two), now);
        assert!(!tick(&mut app, now + Duration::from_millis(10)));
        assert!(tick(&mut app, now + DEFAULT_COMMIT_TIMEOUT));
        assert_eq!(app.composer.active_key(), None);
        assert_eq!(app.composer.text(), "a");
    }

    #[test]
    fn tick_expires_buzz() {
        let (mut app, now) = app_at(Screen::Editor);
        act(&mut app, Action::Key(Key::Two), now);
        assert!(app.is_buzzing());
        tick(&mut app, now + KEYPAD_PULSE);
        assert!(!app.is_buzzing());
    }

    #[test]
    fn cursor_blinks() {
        let (mut app, now) = app_at(Screen::Editor);
        assert!(app.cursor_on);
        assert!(tick(&mut app, now + BLINK_INTERVAL));
        assert!(!app.cursor_on);
        assert!(tick(&mut app, now + BLINK_INTERVAL * 2));
        assert!(app.cursor_on);
    }

    #[test]
    fn wakeup_is_bounded_by_commit_deadline() {
        let (mut app, now) = app_at(Screen::Editor);
        assert_eq!(next_wakeup(&app, now), BLINK_INTERVAL);

        let later = now + Duration::from_millis(450);
        act(&mut app, Action::Key(Key::Two), later);
        // buzz ends first (20 ms), then blink (50 ms), then commit (600 ms)
        assert_eq!(next_wakeup(&app, later), KEYPAD_PULSE);

        tick(&mut app, later + KEYPAD_PULSE);
        assert_eq!(
            next_wakeup(&app, later + KEYPAD_PULSE),
            Duration::from_millis(30)
        );

        // past the blink boundary, the commit deadline is next
        let after_blink = later + Duration::from_millis(550);
        tick(&mut app, after_blink);
        assert_eq!(app.composer.active_key(), Some(Key::Two));
        assert_eq!(
            next_wakeup(&app, after_blink),
            Duration::from_millis(50)
        );
    }
}
