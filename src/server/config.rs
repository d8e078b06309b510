//! Configuration loading for converterd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.converter/config.toml` (user)
//! 3. `/etc/converter/config.toml` (system)
//!
//! When no file is found the built-in defaults are used.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::DEFAULT_MAX_SERIES_LEN;
use crate::harness::DEFAULT_STREAM_BUFFER;
use crate::{Converter, ConverterError, EmbeddedConverter, Result};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5264).
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            limits: LimitsConfig::default(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:5264".to_string()
}

/// Resource limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Longest series one call may request (default: 1000).
    #[serde(default = "default_max_series_len")]
    pub max_series_len: u32,
    /// Responses buffered per streaming call (default: 16).
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_series_len: default_max_series_len(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

fn default_max_series_len() -> u32 {
    DEFAULT_MAX_SERIES_LEN
}

fn default_stream_buffer() -> usize {
    DEFAULT_STREAM_BUFFER
}

/// Artificial delays between streamed responses.
///
/// Purely cosmetic; useful for watching a stream arrive item by item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PacingConfig {
    /// Delay between series responses in milliseconds (default: 0).
    #[serde(default)]
    pub series_delay_ms: u64,
    /// Delay after each duplex response in milliseconds (default: 0).
    #[serde(default)]
    pub stream_delay_ms: u64,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.converter/config.toml`
    /// 3. `/etc/converter/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Config::default()),
        }
    }

    /// Parse a config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConverterError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ConverterError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ConverterError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".converter").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/converter/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Build the converter this configuration describes.
    pub fn build_converter(&self) -> Result<EmbeddedConverter> {
        Converter::builder()
            .series_pacing(Duration::from_millis(self.pacing.series_delay_ms))
            .stream_pacing(Duration::from_millis(self.pacing.stream_delay_ms))
            .stream_buffer(self.server.limits.stream_buffer)
            .max_series_len(self.server.limits.max_series_len)
            .build()
    }
}
