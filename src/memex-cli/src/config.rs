//! Configuration management for memex CLI

use anyhow::{Context, Result};
use memex::{ParsePolicy, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where dumps go when `--output` is not given
    pub output: PathBuf,
    /// How long a launched process may unpack before its memory is read
    pub settle_delay_ms: u64,
    pub parse_policy: ParsePolicy,
    pub require_root: bool,
    /// Read granularity inside a region
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: PathBuf::from("output.dump"),
            settle_delay_ms: 500,
            parse_policy: ParsePolicy::Skip,
            require_root: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("memex");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
