//! Persisted bridge settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::channel::DEFAULT_CHANNEL_PREFIX;

/// File name used under the per-user config directory.
const SETTINGS_FILE: &str = "settings.json";

/// Settings persisted to `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Prefix of every channel name, e.g. `com.example.yol_app`.
    pub channel_prefix: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

/// Build the settings path and ensure the directory exists.
pub fn settings_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("dev", "wallpaper_bridge", "wallpaper_bridge")
        .ok_or_else(|| anyhow!("cannot determine config directory"))?;
    let config_dir = proj_dirs.config_dir();
    fs::create_dir_all(config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;
    Ok(config_dir.join(SETTINGS_FILE))
}

/// Load settings from disk, returning defaults when missing or unreadable.
pub fn load() -> BridgeSettings {
    match settings_path() {
        Ok(path) => load_from(&path),
        Err(_) => BridgeSettings::default(),
    }
}

pub fn load_from(path: &Path) -> BridgeSettings {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return BridgeSettings::default(),
    };
    serde_json::from_str(&contents).unwrap_or_default()
}

/// Persist settings as pretty JSON.
pub fn save_to(path: &Path, settings: &BridgeSettings) -> Result<()> {
    let contents = serde_json::to_string_pretty(settings)?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
