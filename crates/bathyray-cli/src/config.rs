//! TOML configuration for the CLI.

use anyhow::{Context, Result};
use bathyray_profile::ProfileSettings;
use bathyray_trace::{FanSettings, TraceSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for every stage, each table optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profile: ProfileSettings,
    pub trace: TraceSettings,
    pub fan: FanSettings,
}

impl Config {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.profile.validate()?;
        config.trace.validate()?;
        config.fan.validate()?;
        Ok(config)
    }
}
