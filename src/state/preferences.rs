use crate::components::theme::Theme;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wc26_core::timezone::TimezoneMode;

const PREFS_DIR: &str = "wc26tui";
const PREFS_FILE: &str = "prefs.json";

/// The user's choices that survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Team id picked on the Teams tab.
    pub team: Option<String>,
    pub timezone: TimezoneMode,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            team: None,
            timezone: TimezoneMode::detect(),
            theme: Theme::default(),
        }
    }
}

impl Preferences {
    /// `$XDG_CONFIG_HOME/wc26tui/prefs.json`, then `~/.config/...`, then the working directory.
    pub fn path() -> PathBuf {
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
            && !config_dir.trim().is_empty()
        {
            return PathBuf::from(config_dir).join(PREFS_DIR).join(PREFS_FILE);
        }
        if let Ok(home) = std::env::var("HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home).join(".config").join(PREFS_DIR).join(PREFS_FILE);
        }
        PathBuf::from(PREFS_FILE)
    }

    /// Missing or unreadable files give the defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(raw) = fs::read_to_string(path) else {
            debug!("no preferences at {}", path.display());
            return Self::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("ignoring unreadable preferences {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| format!("create dir failed: {e}"))?;
        }
        let payload = serde_json::to_string_pretty(self)
            .map_err(|e| format!("serialize preferences failed: {e}"))?;
        fs::write(path, payload).map_err(|e| format!("write preferences failed: {e}"))
    }
}
