//! Tone and haptic feedback collaborators.
//!
//! The composer never plays sounds or vibrates. It returns [`Feedback`]
//! requests and the effects boundary hands them to a [`TonePlayer`] and a
//! [`Haptics`] implementation through [`sound`] and [`buzz`], which
//! swallow every failure. Missing audio or vibration support must never
//! reach the composer.

use std::io::{self, Write};
use std::time::Duration;

use tracing::debug;

use crate::types::Key;

// ============================================================================
// CONSTANTS
// ============================================================================

/// DTMF row frequencies in Hz, top to bottom.
pub const DTMF_ROW_HZ: [u16; 4] = [697, 770, 852, 941];

/// DTMF column frequencies in Hz, left to right.
pub const DTMF_COL_HZ: [u16; 4] = [1209, 1336, 1477, 1633];

/// How long a key tone sounds.
pub const KEY_TONE_DURATION: Duration = Duration::from_millis(200);

/// Pulse for keypad presses.
pub const KEYPAD_PULSE: Duration = Duration::from_millis(20);

/// Pulse for navigation buttons (soft keys, center).
pub const NAVIGATION_PULSE: Duration = Duration::from_millis(30);

// ============================================================================
// REQUESTS
// ============================================================================

/// A sound the phone makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Dual-tone key beep.
    Key(Key),
    /// Incoming-call ringtone.
    Ringtone,
}

impl Tone {
    /// The (row, column) DTMF frequency pair of a key tone.
    pub fn dtmf_pair(self) -> Option<(u16, u16)> {
        match self {
            Tone::Key(key) => {
                let (row, col) = key.grid_position();
                Some((DTMF_ROW_HZ[row], DTMF_COL_HZ[col]))
            }
            Tone::Ringtone => None,
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.dtmf_pair() {
            Some((row, col)) => write!(f, "{}+{} Hz", row, col),
            None => write!(f, "ringtone"),
        }
    }
}

/// Alternating on/off vibration durations, starting with "on".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibrationPattern(pub Vec<Duration>);

impl VibrationPattern {
    /// A single pulse.
    pub fn pulse(duration: Duration) -> Self {
        VibrationPattern(vec![duration])
    }

    /// The incoming-call buzz: seven one-second pulses, 100 ms apart.
    pub fn ring() -> Self {
        let on = Duration::from_millis(1000);
        let off = Duration::from_millis(100);
        let mut steps = Vec::with_capacity(13);
        for i in 0..7 {
            if i > 0 {
                steps.push(off);
            }
            steps.push(on);
        }
        VibrationPattern(steps)
    }

    /// Wall time from the first pulse to the end of the last.
    pub fn total(&self) -> Duration {
        self.0.iter().sum()
    }
}

/// Feedback requested by a composer or phone transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Tone(Tone),
    Vibrate(VibrationPattern),
}

impl Feedback {
    /// Tone plus pulse for a keypad press.
    pub fn keypad(key: Key) -> Vec<Feedback> {
        vec![
            Feedback::Vibrate(VibrationPattern::pulse(KEYPAD_PULSE)),
            Feedback::Tone(Tone::Key(key)),
        ]
    }

    /// Pulse for a navigation button.
    pub fn navigation() -> Vec<Feedback> {
        vec![Feedback::Vibrate(VibrationPattern::pulse(NAVIGATION_PULSE))]
    }
}

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Why a collaborator could not deliver feedback.
#[derive(Debug)]
pub enum FeedbackError {
    /// The platform has no such capability.
    Unsupported,
    /// Writing to the output device failed.
    Io(io::Error),
}

impl std::fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackError::Unsupported => write!(f, "Not supported on this platform"),
            FeedbackError::Io(e) => write!(f, "Output failed: {}", e),
        }
    }
}

impl std::error::Error for FeedbackError {}

impl From<io::Error> for FeedbackError {
    fn from(e: io::Error) -> Self {
        FeedbackError::Io(e)
    }
}

/// Something that can sound a tone.
pub trait TonePlayer {
    fn play(&mut self, tone: &Tone) -> Result<(), FeedbackError>;
}

/// Something that can vibrate.
pub trait Haptics {
    fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<(), FeedbackError>;
}

/// Rings the terminal bell. One bell per key, three for the ringtone.
pub struct BellTonePlayer<W: Write> {
    out: W,
}

impl<W: Write> BellTonePlayer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> TonePlayer for BellTonePlayer<W> {
    fn play(&mut self, tone: &Tone) -> Result<(), FeedbackError> {
        let bells: &[u8] = match tone {
            Tone::Key(_) => b"\x07",
            Tone::Ringtone => b"\x07\x07\x07",
        };
        self.out.write_all(bells)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Plays nothing (`--mute`).
#[derive(Debug, Default)]
pub struct SilentTonePlayer;

impl TonePlayer for SilentTonePlayer {
    fn play(&mut self, _tone: &Tone) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// No vibration motor.
#[derive(Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _pattern: &VibrationPattern) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unsupported)
    }
}

/// Records vibration requests in the log instead of buzzing.
#[derive(Debug, Default)]
pub struct LoggingHaptics;

impl Haptics for LoggingHaptics {
    fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<(), FeedbackError> {
        debug!(steps = pattern.0.len(), total_ms = pattern.total().as_millis() as u64, "vibrate");
        Ok(())
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Play a tone, swallowing any failure.
pub fn sound(player: &mut dyn TonePlayer, tone: &Tone) {
    if let Err(e) = player.play(tone) {
        debug!(%tone, error = %e, "tone dropped");
    }
}

/// Vibrate, swallowing any failure.
pub fn buzz(haptics: &mut dyn Haptics, pattern: &VibrationPattern) {
    if let Err(e) = haptics.vibrate(pattern) {
        debug!(error = %e, "vibration dropped");
    }
}

/// Deliver a batch of feedback requests.
pub fn deliver(feedback: &[Feedback], player: &mut dyn TonePlayer, haptics: &mut dyn Haptics) {
    for item in feedback {
        match item {
            Feedback::Tone(tone) => sound(player, tone),
            Feedback::Vibrate(pattern) => buzz(haptics, pattern),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSpeaker {
        attempts: usize,
    }

    impl TonePlayer for BrokenSpeaker {
        fn play(&mut self, _tone: &Tone) -> Result<(), FeedbackError> {
            self.attempts += 1;
            Err(FeedbackError::Io(io::Error::other("no audio device")))
        }
    }

    #[derive(Default)]
    struct RecordingHaptics(Vec<VibrationPattern>);

    impl Haptics for RecordingHaptics {
        fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<(), FeedbackError> {
            self.0.push(pattern.clone());
            Ok(())
        }
    }

    #[test]
    fn dtmf_pairs_follow_grid() {
        assert_eq!(Tone::Key(Key::One).dtmf_pair(), Some((697, 1209)));
        assert_eq!(Tone::Key(Key::Five).dtmf_pair(), Some((770, 1336)));
        assert_eq!(Tone::Key(Key::Zero).dtmf_pair(), Some((941, 1336)));
        assert_eq!(Tone::Key(Key::Hash).dtmf_pair(), Some((941, 1477)));
        assert_eq!(Tone::Ringtone.dtmf_pair(), None);
    }

    #[test]
    fn tone_display_shows_frequencies() {
        assert_eq!(Tone::Key(Key::Two).to_string(), "697+1336 Hz");
        assert_eq!(Tone::Ringtone.to_string(), "ringtone");
    }

    #[test]
    fn ring_pattern_alternates() {
        let pattern = VibrationPattern::ring();
        assert_eq!(pattern.0.len(), 13);
        assert_eq!(pattern.0[0], Duration::from_millis(1000));
        assert_eq!(pattern.0[1], Duration::from_millis(100));
        assert_eq!(pattern.total(), Duration::from_millis(7600));
    }

    #[test]
    fn bell_player_writes_bells() {
        let mut out = Vec::new();
        {
            let mut player = BellTonePlayer::new(&mut out);
            player.play(&Tone::Key(Key::Two)).unwrap();
            player.play(&Tone::Ringtone).unwrap();
        }
        assert_eq!(out, b"\x07\x07\x07\x07");
    }

    #[test]
    fn failures_are_swallowed() {
        let mut speaker = BrokenSpeaker { attempts: 0 };
        let mut haptics = NoHaptics;
        deliver(&Feedback::keypad(Key::Four), &mut speaker, &mut haptics);
        assert_eq!(speaker.attempts, 1);
    }

    #[test]
    fn deliver_routes_each_request() {
        let mut player = SilentTonePlayer;
        let mut haptics = RecordingHaptics::default();
        let mut batch = Feedback::keypad(Key::Two);
        batch.extend(Feedback::navigation());
        deliver(&batch, &mut player, &mut haptics);
        assert_eq!(
            haptics.0,
            vec![
                VibrationPattern::pulse(KEYPAD_PULSE),
                VibrationPattern::pulse(NAVIGATION_PULSE),
            ]
        );
    }
}
