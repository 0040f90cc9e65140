//! Tracing subscriber setup.
//!
//! The interactive phone owns the terminal, so its logs must never reach
//! stdout or stderr: they go to a file or nowhere. The one-shot commands
//! log to stderr. `RUST_LOG` overrides the default filter either way.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Where log lines go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// No subscriber at all.
    Off,
}

/// Default filter directive.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "nokia_t9=debug"
    } else {
        "nokia_t9=warn"
    }
}

/// Install the global subscriber.
///
/// # Errors
/// Fails when the log file cannot be opened or a subscriber is already set.
pub fn init(target: LogTarget<'_>, verbose: bool) -> io::Result<()> {
    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stderr => install(io::stderr, true, verbose),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            install(Mutex::new(file), false, verbose)
        }
    }
}

fn install<W>(writer: W, ansi: bool, verbose: bool) -> io::Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(ansi)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(io::Error::other)
}
