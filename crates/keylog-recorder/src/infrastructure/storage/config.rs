//! TOML-based configuration for the recorder.
//!
//! Reads `RecorderConfig` from the platform-appropriate config file:
//! - Linux:    `$XDG_CONFIG_HOME/keylog/config.toml` or `~/.config/keylog/config.toml`
//! - macOS:    `~/Library/Application Support/Keylog/config.toml`
//! - Windows:  `%APPDATA%\Keylog\config.toml`
//!
//! ```toml
//! [output]
//! path = "/Users/me/keys.bin"
//! stdout = false
//! flush_every_record = true
//!
//! [encoder]
//! idle_gap_ms = 500
//!
//! [logging]
//! level = "warn"
//! ```
//!
//! Every field has a serde default, so a partial file (or none at all) is
//! valid.  Command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use keylog_core::engine::EncoderConfig;
use keylog_core::session::DEFAULT_IDLE_GAP_MS;
use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is syntactically valid but unusable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level recorder configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RecorderConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub encoder: EncoderSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the two outputs go.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Binary log file.  Without one, only the display stream is produced.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Print display tokens to stdout even when writing a log file.
    #[serde(default)]
    pub stdout: bool,
    /// Flush the log file after every record.
    #[serde(default)]
    pub flush_every_record: bool,
}

/// Encoder tunables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EncoderSettings {
    /// Pause in milliseconds after which the display stream starts a new line.
    #[serde(default = "default_idle_gap_ms")]
    pub idle_gap_ms: i64,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_idle_gap_ms() -> i64 {
    DEFAULT_IDLE_GAP_MS
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            idle_gap_ms: default_idle_gap_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl RecorderConfig {
    /// Checks values serde cannot constrain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a negative idle gap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder.idle_gap_ms < 0 {
            return Err(ConfigError::Invalid {
                field: "encoder.idle_gap_ms",
                reason: format!("must be non-negative, got {}", self.encoder.idle_gap_ms),
            });
        }
        Ok(())
    }

    /// Encoder settings in the form the engine takes.
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            idle_gap_ms: self.encoder.idle_gap_ms,
        }
    }

    /// Whether display tokens should be printed.  Without a log file there is
    /// nothing else to show, so stdout is always on.
    pub fn display_enabled(&self) -> bool {
        self.output.stdout || self.output.path.is_none()
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from the default location, returning defaults if the
/// file does not exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<RecorderConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads the config from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::Invalid`] for unusable values.
pub fn load_config_from(path: &Path) -> Result<RecorderConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<RecorderConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RecorderConfig::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Resolves the platform config directory for the recorder.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Keylog"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keylog"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Keylog")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
