//! nokia-t9 CLI
//!
//! Multi-tap T9 text entry on a terminal Nokia 3310.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use nokia_t9::config::{Settings, default_config_path};
use nokia_t9::keymap::Preset;
use nokia_t9::logging::{self, LogTarget};
use nokia_t9::replay::{parse_script, replay};
use nokia_t9::report::{format_composition, format_keymap};
use nokia_t9::tui;
use nokia_t9::types::{OutputFormat, Purpose};

#[derive(Parser)]
#[command(name = "nokia-t9")]
#[command(about = "Terminal Nokia 3310 with multi-tap T9 text entry")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    /// What to do (default: run the phone)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand. Flags override the settings file.
#[derive(Args)]
struct GlobalOpts {
    /// Settings file (default: <config dir>/nokia-t9/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Key map preset
    #[arg(long, value_enum, global = true)]
    preset: Option<PresetArg>,

    /// Commit timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// What is being typed
    #[arg(long, value_enum, global = true)]
    purpose: Option<PurposeArg>,

    /// Disable key tones
    #[arg(long, global = true, conflicts_with = "no_mute")]
    mute: bool,

    /// Enable key tones even if the settings file mutes them
    #[arg(long, global = true)]
    no_mute: bool,

    /// Append logs to this file (the phone itself never logs to the terminal)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive phone
    Run,

    /// Replay a key script and print the composed text
    Type {
        /// Keys 0-9 * #, `_` to wait out the timeout, `<` backspace, `~` clear
        script: String,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Show the effective key map
    Keymap {
        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the settings file location
    Path,
    /// Print the effective settings as TOML
    Show,
    /// Write a default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PresetArg {
    Nokia,
    Letters,
    Email,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Nokia => Preset::Nokia,
            PresetArg::Letters => Preset::Letters,
            PresetArg::Email => Preset::Email,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum PurposeArg {
    Message,
    Email,
}

impl From<PurposeArg> for Purpose {
    fn from(arg: PurposeArg) -> Self {
        match arg {
            PurposeArg::Message => Purpose::Message,
            PurposeArg::Email => Purpose::Email,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run);

    // The phone owns the terminal: only a log file is safe there
    let target = match (&command, cli.opts.log_file.as_deref()) {
        (_, Some(path)) => LogTarget::File(path),
        (Commands::Run, None) => LogTarget::Off,
        (_, None) => LogTarget::Stderr,
    };
    if let Err(e) = logging::init(target, cli.opts.verbose) {
        eprintln!("Error: could not set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match command {
        Commands::Run => cmd_run(&cli.opts),
        Commands::Type { script, format } => cmd_type(&cli.opts, &script, format.into()),
        Commands::Keymap { format } => cmd_keymap(&cli.opts, format.into()),
        Commands::Config { action } => match action {
            ConfigAction::Path => cmd_config_path(&cli.opts),
            ConfigAction::Show => cmd_config_show(&cli.opts),
            ConfigAction::Init { force } => cmd_config_init(&cli.opts, force),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// SETTINGS RESOLUTION
// ============================================================================

/// Settings file values with command-line flags applied on top.
fn resolve_settings(opts: &GlobalOpts) -> Result<Settings, String> {
    let mut settings = Settings::discover(opts.config.as_deref()).map_err(|e| e.to_string())?;
    apply_overrides(&mut settings, opts);
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, opts: &GlobalOpts) {
    if let Some(preset) = opts.preset {
        settings.preset = preset.into();
    }
    if let Some(timeout_ms) = opts.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    if let Some(purpose) = opts.purpose {
        settings.purpose = purpose.into();
    }
    if opts.mute {
        settings.mute = true;
    }
    if opts.no_mute {
        settings.mute = false;
    }
}

fn settings_path(opts: &GlobalOpts) -> Result<PathBuf, String> {
    match &opts.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path().map_err(|e| e.to_string()),
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn cmd_run(opts: &GlobalOpts) -> Result<(), String> {
    let settings = resolve_settings(opts)?;
    let composer = settings.composer().map_err(|e| e.to_string())?;
    tui::run(composer, settings.purpose, settings.mute).map_err(|e| e.to_string())
}

fn cmd_type(opts: &GlobalOpts, script: &str, format: OutputFormat) -> Result<(), String> {
    let settings = resolve_settings(opts)?;
    let steps = parse_script(script).map_err(|e| e.to_string())?;
    let mut composer = settings.composer().map_err(|e| e.to_string())?;

    let result = replay(&mut composer, &steps, Instant::now());
    composer.teardown();

    print!(
        "{}",
        format_composition(&result.composition, settings.purpose, format)
    );
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn cmd_keymap(opts: &GlobalOpts, format: OutputFormat) -> Result<(), String> {
    let settings = resolve_settings(opts)?;
    let keymap = settings.keymap().map_err(|e| e.to_string())?;

    if format == OutputFormat::Human {
        println!("Preset: {}", settings.preset);
        if settings.keymap.is_some() {
            println!("(with overrides from settings file)");
        }
        println!();
    }
    print!("{}", format_keymap(&keymap, format));
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn cmd_config_path(opts: &GlobalOpts) -> Result<(), String> {
    let path = settings_path(opts)?;
    let status = if path.exists() { "" } else { " (not created)" };
    println!("{}{}", path.display(), status);
    Ok(())
}

fn cmd_config_show(opts: &GlobalOpts) -> Result<(), String> {
    let settings = resolve_settings(opts)?;
    // Surface invalid values here rather than at the next `run`
    settings.timeout().map_err(|e| e.to_string())?;
    settings.keymap().map_err(|e| e.to_string())?;
    print!("{}", settings.to_toml_string().map_err(|e| e.to_string())?);
    Ok(())
}

fn cmd_config_init(opts: &GlobalOpts, force: bool) -> Result<(), String> {
    let path = settings_path(opts)?;
    Settings::init(&path, force).map_err(|e| e.to_string())?;
    println!("Wrote {}", path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn overridden(args: &[&str], file: Settings) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut settings = file;
        apply_overrides(&mut settings, &cli.opts);
        settings
    }

    fn muted_file() -> Settings {
        Settings {
            mute: true,
            ..Default::default()
        }
    }

    #[test]
    fn file_mute_survives_without_flags() {
        assert!(overridden(&["nokia-t9"], muted_file()).mute);
    }

    #[test]
    fn no_mute_overrides_file() {
        assert!(!overridden(&["nokia-t9", "--no-mute"], muted_file()).mute);
        assert!(!overridden(&["nokia-t9", "run", "--no-mute"], muted_file()).mute);
    }

    #[test]
    fn mute_flag_mutes() {
        assert!(overridden(&["nokia-t9", "--mute"], Settings::default()).mute);
    }

    #[test]
    fn mute_and_no_mute_conflict() {
        assert!(Cli::try_parse_from(["nokia-t9", "--mute", "--no-mute"]).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let settings = overridden(
            &["nokia-t9", "type", "22", "--timeout-ms", "900", "--preset", "letters"],
            Settings::default(),
        );
        assert_eq!(settings.timeout_ms, 900);
        assert_eq!(settings.preset, Preset::Letters);
    }
}
