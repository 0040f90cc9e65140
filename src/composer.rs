//! Multi-tap text composer: the T9 keypad state machine.
//!
//! Two states. `Idle` has no key in progress. `Cycling` has an active key,
//! a position in its candidate list, and a live commit deadline.
//!
//! ```text
//! Idle         --press(k)-->   Cycling(k, 0)
//! Cycling(k,i) --press(k)-->   Cycling(k, (i+1) mod n)   deadline reset
//! Cycling(k,i) --press(j)-->   Cycling(j, 0)             old deadline canceled
//! Cycling(k,i) --timeout-->    Idle
//! Cycling(k,i) --backspace-->  Idle                      buffer shortened
//! Idle         --backspace-->  Idle                      buffer shortened or unchanged
//! ```
//!
//! Invariant: while cycling, the last char of the buffer is the selected
//! candidate of the active key, or that candidate with its case flipped by
//! `#`.
//!
//! Every operation takes the current time as an argument and returns the
//! feedback it wants played. Nothing here touches a clock, a speaker or a
//! vibration motor.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::feedback::Feedback;
use crate::keymap::KeyMap;
use crate::text::toggle_case;
use crate::timer::CommitTimer;
use crate::types::Key;

/// Default inactivity window before the cycling character is committed.
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_millis(600);

// ============================================================================
// STATE
// ============================================================================

/// Where the composer is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No key in progress. The next press starts a new character.
    Idle,
    /// `key` is being cycled; `index` selects its current candidate.
    Cycling { key: Key, index: usize },
}

/// Turns keypad presses into text.
#[derive(Debug, Clone)]
pub struct Composer {
    keymap: KeyMap,
    timeout: Duration,
    buffer: String,
    phase: Phase,
    timer: CommitTimer,
}

impl Composer {
    /// A composer with an empty buffer, in `Idle`.
    pub fn new(keymap: KeyMap, timeout: Duration) -> Self {
        Composer {
            keymap,
            timeout,
            buffer: String::new(),
            phase: Phase::Idle,
            timer: CommitTimer::new(),
        }
    }

    /// Composed text so far, including the cycling character.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// The key being cycled, if any. The display uses this for its cursor.
    pub fn active_key(&self) -> Option<Key> {
        match self.phase {
            Phase::Idle => None,
            Phase::Cycling { key, .. } => Some(key),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// When the cycling character will be committed, if a key is cycling.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Time left before the cycling character is committed.
    pub fn time_to_commit(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Handle one keypad activation.
    ///
    /// `#` toggles the case of the last character. Any other key either
    /// advances the active key's cycle or starts a new character.
    pub fn handle_key_press(&mut self, key: Key, now: Instant) -> Vec<Feedback> {
        let feedback = Feedback::keypad(key);

        if key.is_case_toggle() {
            self.toggle_last_case();
            return feedback;
        }

        let len = self.keymap.cycle_len(key);
        debug_assert!(len > 0, "key '{}' has no candidates", key);
        if len == 0 {
            warn!(%key, "ignoring key without candidates");
            return feedback;
        }

        match self.phase {
            Phase::Cycling { key: active, index } if active == key => {
                self.timer.cancel();
                let next = (index + 1) % len;
                self.replace_last(key, next);
                self.phase = Phase::Cycling { key, index: next };
                trace!(%key, index = next, "cycle");
            }
            _ => {
                self.timer.cancel();
                if let Some(first) = self.keymap.candidate(key, 0) {
                    self.buffer.push(first);
                }
                self.phase = Phase::Cycling { key, index: 0 };
                trace!(%key, "new character");
            }
        }
        self.timer.schedule(now, self.timeout);

        feedback
    }

    /// Delete the last character and stop any cycle in progress.
    ///
    /// No-op on an empty buffer apart from the feedback pulse.
    pub fn handle_backspace(&mut self) -> Vec<Feedback> {
        self.buffer.pop();
        self.reset_phase();
        debug!(len = self.buffer.chars().count(), "backspace");
        Feedback::navigation()
    }

    /// Empty the buffer and return to `Idle`.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.reset_phase();
        debug!("cleared");
    }

    /// Commit the cycling character if its deadline has passed.
    ///
    /// Returns true when a commit happened. The buffer is unchanged: the
    /// current candidate simply becomes final.
    pub fn poll_commit(&mut self, now: Instant) -> bool {
        if !self.timer.poll(now) {
            return false;
        }
        if let Phase::Cycling { key, index } = self.phase {
            trace!(%key, index, "commit");
        }
        self.phase = Phase::Idle;
        true
    }

    /// Cancel the pending deadline before the composer goes away.
    pub fn teardown(&mut self) {
        self.timer.cancel();
        self.phase = Phase::Idle;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn reset_phase(&mut self) {
        self.timer.cancel();
        self.phase = Phase::Idle;
    }

    fn replace_last(&mut self, key: Key, index: usize) {
        if let Some(c) = self.keymap.candidate(key, index) {
            self.buffer.pop();
            self.buffer.push(c);
        }
    }

    fn toggle_last_case(&mut self) {
        let Some(last) = self.buffer.chars().last() else {
            return;
        };
        if let Some(flipped) = toggle_case(last) {
            self.buffer.pop();
            self.buffer.push(flipped);
            trace!(from = %last, to = %flipped, "case toggle");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
