//! Interactive phone simulator.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: pure data types (App, Screen, Action, Transition)
//! - `update`: transitions and the simulated clock
//! - `view`: pure rendering
//! - `run`: the only effects (terminal, key reader, tones)
//! - `theme`: style constants

pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use run::run;
