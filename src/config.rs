//! Settings file: commit timeout, key map preset, custom key map.
//!
//! Settings live in a TOML file under the platform config directory
//! (`~/.config/nokia-t9/config.toml` on Linux). Every field is optional;
//! missing fields take their defaults. A `[keymap]` table overlays the
//! chosen preset key by key:
//!
//! ```toml
//! timeout_ms = 800
//! preset = "letters"
//!
//! [keymap]
//! "1" = ".,?!"
//! ```
//!
//! Validation happens when the settings are turned into a composer, so a
//! bad key map fails at startup rather than on a key press.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::composer::{Composer, DEFAULT_COMMIT_TIMEOUT};
use crate::keymap::{KeyMap, KeyMapError, Preset};
use crate::types::Purpose;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "nokia-t9";

/// Settings file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Longest accepted commit timeout. Anything slower stops feeling like
/// multi-tap.
pub const MAX_TIMEOUT_MS: u64 = 10_000;

const INIT_HEADER: &str = "\
# nokia-t9 settings
#
# timeout_ms: inactivity window before a cycling letter is committed
# preset:     nokia | letters | email
# purpose:    message | email
#
# Remap individual keys with a [keymap] table, for example:
#
# [keymap]
# \"1\" = \".,?!\"

";

// ============================================================================
// TYPES
// ============================================================================

/// Everything a settings file can say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Commit timeout in milliseconds.
    pub timeout_ms: u64,
    /// Base key map.
    pub preset: Preset,
    /// What is being typed.
    pub purpose: Purpose,
    /// Disable key tones.
    pub mute: bool,
    /// Per-key overrides on top of the preset (symbol → candidates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keymap: Option<BTreeMap<String, String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_COMMIT_TIMEOUT.as_millis() as u64,
            preset: Preset::default(),
            purpose: Purpose::default(),
            mute: false,
            keymap: None,
        }
    }
}

/// Error loading, saving or validating settings.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    Io { path: PathBuf, source: io::Error },
    /// The file is not valid settings TOML.
    Parse(toml::de::Error),
    /// Settings could not be rendered as TOML.
    Serialize(toml::ser::Error),
    /// The resulting key map is unusable.
    KeyMap(KeyMapError),
    /// Timeout is zero or absurdly long.
    InvalidTimeout(u64),
    /// Refusing to overwrite an existing file.
    AlreadyExists(PathBuf),
    /// The platform has no config directory.
    NoConfigDir,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ConfigError::Parse(e) => write!(f, "Invalid settings file: {}", e),
            ConfigError::Serialize(e) => write!(f, "Could not write settings: {}", e),
            ConfigError::KeyMap(e) => write!(f, "Invalid key map: {}", e),
            ConfigError::InvalidTimeout(ms) => write!(
                f,
                "Commit timeout must be between 1 and {} ms, got {}",
                MAX_TIMEOUT_MS, ms
            ),
            ConfigError::AlreadyExists(path) => {
                write!(f, "{} already exists (use --force to overwrite)", path.display())
            }
            ConfigError::NoConfigDir => write!(f, "Could not determine config directory"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<KeyMapError> for ConfigError {
    fn from(e: KeyMapError) -> Self {
        ConfigError::KeyMap(e)
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// Default settings path: `<config dir>/nokia-t9/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or(ConfigError::NoConfigDir)
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Render settings as TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Resolve the settings to use.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Ok(path) if path.exists() => Self::load(&path),
            Ok(path) => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(ConfigError::NoConfigDir) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Write default settings to `path`, creating parent directories.
    pub fn init(path: &Path, force: bool) -> Result<Self, ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let settings = Self::default();
        let content = format!("{}{}", INIT_HEADER, settings.to_toml_string()?);
        std::fs::write(path, content).map_err(io_err)?;
        info!(path = %path.display(), "wrote default settings");
        Ok(settings)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// The commit timeout, checked for sanity.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::InvalidTimeout(self.timeout_ms));
        }
        Ok(Duration::from_millis(self.timeout_ms))
    }

    /// The preset with per-key overrides applied, validated.
    pub fn keymap(&self) -> Result<KeyMap, ConfigError> {
        let base = KeyMap::preset(self.preset);
        let Some(overrides) = &self.keymap else {
            return Ok(base);
        };
        let mut table: std::collections::HashMap<String, String> =
            base.to_strings().into_iter().collect();
        table.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(KeyMap::from_strings(&table)?)
    }

    /// A fresh composer built from these settings.
    pub fn composer(&self) -> Result<Composer, ConfigError> {
        Ok(Composer::new(self.keymap()?, self.timeout()?))
    }
}

// ============================================================================
// TESTS
// ============================================================================
