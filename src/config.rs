//! Configuration for the directory viewer.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides (applied by the commands)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `DIRVIEW_` and use double
//! underscores to separate nested levels:
//! - `DIRVIEW_ROOT=/srv/files` sets `root`
//! - `DIRVIEW_SERVER__BIND=0.0.0.0:8080` sets `server.bind`
//! - `DIRVIEW_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dirview.toml";

const ENV_PREFIX: &str = "DIRVIEW_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Directory mirrored into the web page
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// File watcher settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Checksum manifest settings
    #[serde(default)]
    pub checksums: ChecksumConfig,

    /// Logging levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Interval between SSE keep-alive comments
    #[serde(default = "default_keep_alive_secs")]
    pub sse_keep_alive_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WatchConfig {
    /// Capacity of the channels between the OS watcher thread and the watch loop
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChecksumConfig {
    /// Manifest file name, written inside the root
    #[serde(default = "default_sums_file")]
    pub file_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level applied to every target without an override
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target level overrides
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

// Default value functions
fn default_root() -> PathBuf {
    PathBuf::from("./static")
}
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_keep_alive_secs() -> u64 {
    15
}
fn default_channel_capacity() -> usize {
    100
}
fn default_sums_file() -> String {
    "sums.txt".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: default_root(),
            server: ServerConfig::default(),
            watch: WatchConfig::default(),
            checksums: ChecksumConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            sse_keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            file_name: default_sums_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from defaults, `dirview.toml` and the environment.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path))
            // Double underscore separates nested levels
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Save current configuration to file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
