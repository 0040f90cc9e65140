//! nokia-t9: multi-tap T9 text entry on a terminal Nokia 3310.
//!
//! The library core is [`composer::Composer`], a pure state machine driven
//! by keypad presses and an explicit clock. Everything with side effects
//! (terminal, tones, vibration) sits behind [`feedback`] traits or in
//! [`tui::run`].

pub mod composer;
pub mod config;
pub mod feedback;
pub mod keymap;
pub mod logging;
pub mod replay;
pub mod report;
pub mod text;
pub mod timer;
pub mod tui;
pub mod types;
