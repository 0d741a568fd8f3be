//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the activity log.
    pub log_path: PathBuf,

    /// strftime pattern for timestamps in the log and on the command line.
    ///
    /// Changing this does not reformat an existing log, which will then fail
    /// to parse. Pick a format when starting a log and keep it.
    pub time_format: String,

    /// strftime pattern for command-line times without a date, taken as today.
    pub short_time_format: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("log_path", &self.log_path)
            .field("time_format", &self.time_format)
            .field("short_time_format", &self.short_time_format)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join("log"),
            time_format: "%Y-%m-%dT%H:%M".to_string(),
            short_time_format: "%H:%M".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SWX_*)
        figment = figment.merge(Env::prefixed("SWX_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for swx.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("swx"))
}

/// Returns the platform-specific data directory for swx.
///
/// On Linux: `~/.local/share/swx`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("swx"))
}
