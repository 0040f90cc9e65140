//! Scripted key sequences on a simulated clock.
//!
//! A script is a string of keypad symbols plus a few control marks:
//!
//! | mark | meaning |
//! |---|---|
//! | `0-9 * #` | press that key |
//! | `_` | wait out the commit timeout |
//! | `<` | backspace |
//! | `~` | clear |
//!
//! Whitespace is ignored, so `"44 33 555_555 666"` is the same as
//! `"4433555_555666"`. Steps are spaced [`step_interval`] apart, always
//! shorter than the commit timeout: consecutive presses of one key cycle
//! unless a `_` separates them.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::composer::Composer;
use crate::feedback::Feedback;
use crate::types::Key;

/// Simulated time between two script steps at ordinary timeouts.
pub const STEP_INTERVAL: Duration = Duration::from_millis(100);

/// Step spacing for a commit timeout: [`STEP_INTERVAL`], shrunk to half
/// the timeout when the timeout is short.
pub fn step_interval(timeout: Duration) -> Duration {
    STEP_INTERVAL.min(timeout / 2)
}

// ============================================================================
// PARSING
// ============================================================================

/// One scripted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Press(Key),
    /// Let the commit deadline pass.
    Pause,
    Backspace,
    Clear,
}

/// A character a script may not contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub ch: char,
    /// Zero-based char offset in the script.
    pub position: usize,
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unexpected {:?} at column {} (allowed: 0-9 * # _ < ~)",
            self.ch,
            self.position + 1
        )
    }
}

impl std::error::Error for ScriptError {}

/// Parse a script into steps.
pub fn parse_script(script: &str) -> Result<Vec<Step>, ScriptError> {
    script
        .chars()
        .enumerate()
        .filter(|(_, ch)| !ch.is_whitespace())
        .map(|(position, ch)| match ch {
            '_' => Ok(Step::Pause),
            '<' => Ok(Step::Backspace),
            '~' => Ok(Step::Clear),
            _ => Key::from_char(ch)
                .map(Step::Press)
                .ok_or(ScriptError { ch, position }),
        })
        .collect()
}

// ============================================================================
// EXECUTION
// ============================================================================

/// Final state of a replayed script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Composition {
    /// Composed text, including a still-cycling character.
    pub text: String,
    /// Key still cycling when the script ended.
    pub active_key: Option<Key>,
    pub key_presses: usize,
    /// Characters finalized by the commit timeout.
    pub timeout_commits: usize,
    /// Simulated time the script took.
    pub elapsed_ms: u64,
}

/// Everything a replay produced.
#[derive(Debug, Clone)]
pub struct Replay {
    pub composition: Composition,
    /// Feedback requests in the order the composer made them.
    pub feedback: Vec<Feedback>,
}

/// Run `steps` through `composer`, starting the simulated clock at `start`.
///
/// Before each step the clock advances and any due commit fires, exactly as
/// the interactive loop would between two key events.
pub fn replay(composer: &mut Composer, steps: &[Step], start: Instant) -> Replay {
    let mut now = start;
    let step_gap = step_interval(composer.timeout());
    let mut feedback = Vec::new();
    let mut key_presses = 0;
    let mut timeout_commits = 0;

    for step in steps {
        now += match step {
            Step::Pause => composer.timeout(),
            _ => step_gap,
        };
        if composer.poll_commit(now) {
            timeout_commits += 1;
        }

        match *step {
            Step::Press(key) => {
                key_presses += 1;
                feedback.extend(composer.handle_key_press(key, now));
            }
            Step::Pause => {}
            Step::Backspace => feedback.extend(composer.handle_backspace()),
            Step::Clear => composer.clear(),
        }
        debug!(?step, text = composer.text(), "replayed step");
    }

    Replay {
        composition: Composition {
            text: composer.text().to_string(),
            active_key: composer.active_key(),
            key_presses,
            timeout_commits,
            elapsed_ms: now.duration_since(start).as_millis() as u64,
        },
        feedback,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::DEFAULT_COMMIT_TIMEOUT;
    use crate::keymap::{KeyMap, Preset};

    fn run(script: &str) -> Composition {
        run_with(Preset::Nokia, script)
    }

    fn run_with(preset: Preset, script: &str) -> Composition {
        let steps = parse_script(script).unwrap();
        let mut composer = Composer::new(KeyMap::preset(preset), DEFAULT_COMMIT_TIMEOUT);
        replay(&mut composer, &steps, Instant::now()).composition
    }

    #[test]
    fn parses_marks_and_keys() {
        assert_eq!(
            parse_script("2_<~#").unwrap(),
            vec![
                Step::Press(Key::Two),
                Step::Pause,
                Step::Backspace,
                Step::Clear,
                Step::Press(Key::Hash),
            ]
        );
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(parse_script(" 4 4\n").unwrap(), parse_script("44").unwrap());
        assert!(parse_script("").unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_chars_with_position() {
        let err = parse_script("22 x3").unwrap_err();
        assert_eq!(err, ScriptError { ch: 'x', position: 3 });
        assert!(err.to_string().contains("column 4"));
    }

    #[test]
    fn types_hello() {
        let result = run("44 33 555_555 666");
        assert_eq!(result.text, "hello");
        assert_eq!(result.active_key, Some(Key::Six));
        assert_eq!(result.key_presses, 13);
        assert_eq!(result.timeout_commits, 1);
    }

    #[test]
    fn pause_commits_between_same_key_presses() {
        assert_eq!(run("2_2").text, "aa");
        assert_eq!(run("22").text, "b");
    }

    #[test]
    fn trailing_pause_leaves_nothing_cycling() {
        let result = run("2_");
        assert_eq!(result.active_key, None);
        assert_eq!(result.timeout_commits, 1);
    }

    #[test]
    fn backspace_and_clear() {
        assert_eq!(run("22<").text, "");
        assert_eq!(run("2~3").text, "d");
        assert_eq!(run("<<<").text, "");
    }

    #[test]
    fn hash_toggles_case() {
        assert_eq!(run("2#").text, "A");
        assert_eq!(run("2#2").text, "b");
    }

    #[test]
    fn cycle_wraps_through_digit() {
        assert_eq!(run("22222").text, "a");
        assert_eq!(run_with(Preset::Letters, "2222").text, "a");
    }

    #[test]
    fn elapsed_counts_steps_and_pauses() {
        let result = run("2_2");
        let expected = STEP_INTERVAL * 2 + DEFAULT_COMMIT_TIMEOUT;
        assert_eq!(result.elapsed_ms, expected.as_millis() as u64);
    }

    #[test]
    fn short_timeout_still_cycles() {
        let steps = parse_script("22").unwrap();
        let mut composer = Composer::new(KeyMap::default(), Duration::from_millis(50));
        let result = replay(&mut composer, &steps, Instant::now()).composition;
        assert_eq!(result.text, "b");
        assert_eq!(result.timeout_commits, 0);
        assert_eq!(result.elapsed_ms, 50);
    }

    #[test]
    fn short_timeout_pause_commits() {
        let steps = parse_script("2_2").unwrap();
        let mut composer = Composer::new(KeyMap::default(), Duration::from_millis(1));
        assert_eq!(replay(&mut composer, &steps, Instant::now()).composition.text, "aa");
    }

    #[test]
    fn step_interval_stays_below_timeout() {
        assert_eq!(step_interval(DEFAULT_COMMIT_TIMEOUT), STEP_INTERVAL);
        assert_eq!(step_interval(Duration::from_millis(50)), Duration::from_millis(25));
        assert!(step_interval(Duration::from_millis(1)) < Duration::from_millis(1));
    }

    #[test]
    fn collects_feedback_in_order() {
        let steps = parse_script("2<").unwrap();
        let mut composer = Composer::new(KeyMap::default(), DEFAULT_COMMIT_TIMEOUT);
        let replay = replay(&mut composer, &steps, Instant::now());

        let mut expected = Feedback::keypad(Key::Two);
        expected.extend(Feedback::navigation());
        assert_eq!(replay.feedback, expected);
    }
}
