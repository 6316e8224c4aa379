//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting memex defaults.

use crate::config::Config;
use anyhow::Result;
use memex::ParsePolicy;
use std::path::PathBuf;

/// Requested changes to the stored configuration
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub output: Option<PathBuf>,
    pub delay: Option<u64>,
    pub parse_policy: Option<ParsePolicy>,
    pub require_root: Option<bool>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.output.is_none()
            && self.delay.is_none()
            && self.parse_policy.is_none()
            && self.require_root.is_none()
    }

    /// Apply the update in place
    pub fn apply(self, config: &mut Config) {
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(delay) = self.delay {
            config.settle_delay_ms = delay;
        }
        if let Some(policy) = self.parse_policy {
            config.parse_policy = policy;
        }
        if let Some(require_root) = self.require_root {
            config.require_root = require_root;
        }
    }
}

/// Handle the configure command
pub fn handle(update: ConfigUpdate, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if update.is_empty() {
        show_usage();
        return Ok(());
    }

    update.apply(&mut config);
    config.save()?;

    println!("Configuration updated");
    show_config(&config);
    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    for line in describe(config) {
        println!("{}", line);
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn describe(config: &Config) -> Vec<String> {
    let policy = match config.parse_policy {
        ParsePolicy::Skip => "skip",
        ParsePolicy::Abort => "abort",
    };
    vec![
        format!("Output: {}", config.output.display()),
        format!("Settle delay: {} ms", config.settle_delay_ms),
        format!("Unparsable map lines: {}", policy),
        format!("Require root: {}", config.require_root),
        format!("Chunk size: {} bytes", config.chunk_size),
    ]
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: memex configure --output FILE --delay MS --parse-policy skip|abort");
    println!("   or: memex configure --require-root false");
    println!("   or: memex configure --show");
}
