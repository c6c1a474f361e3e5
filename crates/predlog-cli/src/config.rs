//! `predlog.toml` loading.
//!
//! Lookup order: the `--config` flag (or `$PREDLOG_CONFIG`), then the
//! platform config directory, then built-in defaults:
//! - Linux: ~/.config/predlog/predlog.toml
//! - macOS: ~/Library/Application Support/dev.predlog.predlog/predlog.toml
//! - Windows: %APPDATA%/predlog/predlog/config/predlog.toml

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use predlog_model::ColumnLayout;
use predlog_sink::SinkConfig;

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "predlog";
const APP_NAME: &str = "predlog";
const CONFIG_FILENAME: &str = "predlog.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSection {
    /// Flattened feature names left out of the schema descriptor.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub columns: ColumnLayout,
    pub schema: SchemaSection,
    pub sink: SinkConfig,
}

/// Path of the per-user config file, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Reads a config file the user asked for by name. Any failure is an error.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config =
        toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Resolves the configuration. An explicit path must load; the per-user
/// file falls back to defaults when it is absent or unreadable.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let Some(path) = default_config_path() else {
        warn!("could not determine config directory, using defaults");
        return Ok(Config::default());
    };
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to parse config, using defaults");
                Ok(Config::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read config, using defaults");
            Ok(Config::default())
        }
    }
}
