use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Optional TOML file with per-user defaults for the command-line tool.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliSettings {
    pub device_dir: Option<PathBuf>,
    pub default_timezone: Option<String>,
    pub json_logs: bool,
}

impl CliSettings {
    /// Loads `path`, or `$A3EM_SETTINGS` when no path is given. Without either, defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os("A3EM_SETTINGS") {
                Some(value) => PathBuf::from(value),
                None => return Ok(Self::default()),
            },
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file at '{}'", path.display()))?;
        let settings: CliSettings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings TOML from '{}'", path.display()))?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }
}
