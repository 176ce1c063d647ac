use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::hotkey::Hotkey;

pub const DEFAULT_HOTKEY: &str = "F9";
pub const DEFAULT_URL: &str = "https://www.google.com";

const APP_DIR: &str = "web-opener";
const SETTINGS_FILENAME: &str = "settings.json";

fn default_hotkey() -> String {
    DEFAULT_HOTKEY.to_string()
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

/// User settings. `hotkey` is kept as the persisted identifier so that an
/// unsupported value survives a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_hotkey")]
    pub hotkey: String,
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hotkey: default_hotkey(),
            url: default_url(),
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Hotkey: {}", self.hotkey)?;
        write!(f, "URL: {}", self.url)
    }
}

impl Settings {
    pub fn new(hotkey: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            hotkey: hotkey.into(),
            url: url.into(),
        }
    }

    pub fn resolved_hotkey(&self) -> Option<Hotkey> {
        Hotkey::resolve(&self.hotkey)
    }
}

/// Per-user persistence for [`Settings`], backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted settings. Never fails: anything missing or unreadable
    /// falls back to defaults.
    pub fn load(&self) -> Settings {
        if !self.path.exists() {
            info!("No settings file found, using defaults");
            return Settings::default();
        }

        match self.read() {
            Ok(settings) => {
                debug!("Loaded settings from {}", self.path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring settings file {}: {e:#}", self.path.display());
                Settings::default()
            }
        }
    }

    fn read(&self) -> Result<Settings> {
        let contents = fs::read_to_string(&self.path).context("Failed to read settings file")?;
        serde_json::from_str(&contents).context("Failed to parse settings")
    }

    /// Persist both fields together. The file is replaced with a rename so a
    /// concurrent reader sees either the old pair or the new one.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).context("Failed to write settings file")?;
        fs::rename(&tmp_path, &self.path).context("Failed to replace settings file")?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Per-user config location: `$XDG_CONFIG_HOME` on Linux, Application
    /// Support on macOS and `%APPDATA%` on Windows.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join(SETTINGS_FILENAME)
    }
}
